use axum::{
	Json, Router,
	extract::{Path, Query, State, rejection::JsonRejection},
	http::StatusCode,
	middleware,
	response::{IntoResponse, Response},
	routing::{delete, get, post, put},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
	auth::{self, RequestUser},
	state::AppState,
};
use quill_domain::view::ViewMode;
use quill_service::{
	CategoryView, CreateCategoryRequest, CreateGroupRequest, DeleteResponse, Error, GroupView,
	ListRequest, ListResponse, MemberView, NoteRequest, NoteView,
};

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/v1/notes", get(list_notes).post(create_note))
		.route("/v1/notes/{note_id}", get(get_note).put(update_note).delete(delete_note))
		.route("/v1/view", get(get_view))
		.route("/v1/view/toggle", post(toggle_view))
		.route("/v1/categories", get(list_categories))
		.route("/v1/groups", get(list_groups))
		.layer(middleware::from_fn_with_state(state.clone(), auth::api_auth))
		.route("/health", get(health))
		.with_state(state)
}

pub fn admin_router(state: AppState) -> Router {
	Router::new()
		.route("/v1/admin/categories", post(admin_create_category))
		.route("/v1/admin/categories/{category_id}", delete(admin_delete_category))
		.route("/v1/admin/groups", post(admin_create_group))
		.route("/v1/admin/groups/{group_id}", delete(admin_delete_group))
		.route("/v1/admin/groups/{group_id}/members", get(admin_list_members))
		.route(
			"/v1/admin/groups/{group_id}/members/{user_id}",
			put(admin_add_member).delete(admin_remove_member),
		)
		.route("/v1/admin/users", post(admin_register_user))
		.route("/v1/admin/users/{user_id}", delete(admin_remove_user))
		.layer(middleware::from_fn_with_state(state.clone(), auth::admin_auth))
		.with_state(state)
}

#[derive(Debug, Deserialize)]
struct ListParams {
	q: Option<String>,
	category: Option<String>,
	reminder_date: Option<String>,
	view: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ViewBody {
	view: ViewMode,
}

#[derive(Debug, Deserialize)]
struct RegisterUserBody {
	user_id: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}
impl ApiError {
	fn new(
		status: StatusCode,
		error_code: impl Into<String>,
		message: impl Into<String>,
		fields: Option<Vec<String>>,
	) -> Self {
		Self { status, error_code: error_code.into(), message: message.into(), fields }
	}
}

impl From<Error> for ApiError {
	fn from(err: Error) -> Self {
		match err {
			Error::NotFound { message } =>
				json_error(StatusCode::NOT_FOUND, "not_found", message, None),
			Error::AccessDenied { message } =>
				json_error(StatusCode::FORBIDDEN, "forbidden", message, None),
			Error::InvalidInput { message, fields } =>
				json_error(StatusCode::UNPROCESSABLE_ENTITY, "invalid_input", message, Some(fields)),
			Error::InvalidGroup { message } =>
				json_error(StatusCode::UNPROCESSABLE_ENTITY, "invalid_group", message, None),
			Error::Conflict { message } =>
				json_error(StatusCode::CONFLICT, "conflict", message, None),
			Error::Storage(err) => {
				tracing::error!(error = %err, "Storage failure.");

				json_error(
					StatusCode::INTERNAL_SERVER_ERROR,
					"storage_error",
					"The note store is unavailable. Try again later.",
					None,
				)
			},
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body =
			ErrorBody { error_code: self.error_code, message: self.message, fields: self.fields };

		(self.status, Json(body)).into_response()
	}
}

pub fn json_error(
	status: StatusCode,
	code: &str,
	message: impl Into<String>,
	fields: Option<Vec<String>>,
) -> ApiError {
	ApiError::new(status, code, message, fields)
}

/// Unwraps a JSON body, reporting rejections in the regular error shape.
///
/// Type errors name the offending field, like `$.reminder_at`. Unreadable bodies point at `$`.
fn json_payload<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
	let rejection = match payload {
		Ok(Json(value)) => return Ok(value),
		Err(rejection) => rejection,
	};
	let message = rejection.body_text();
	let (status, field) = match &rejection {
		JsonRejection::JsonDataError(_) =>
			(StatusCode::UNPROCESSABLE_ENTITY, rejected_field(&message)),
		_ => (rejection.status(), "$".to_string()),
	};

	Err(json_error(status, "invalid_input", message, Some(vec![field])))
}

// Deserialization messages read "<prefix>: <path>: <reason>", or name a missing field.
fn rejected_field(message: &str) -> String {
	let detail = message.split_once(": ").map_or(message, |(_, detail)| detail);

	if let Some((_, rest)) = detail.split_once("missing field `")
		&& let Some((name, _)) = rest.split_once('`')
	{
		return format!("$.{name}");
	}

	match detail.split_once(": ") {
		Some((path, _)) if is_field_path(path) => format!("$.{path}"),
		_ => "$".to_string(),
	}
}

fn is_field_path(path: &str) -> bool {
	!path.is_empty()
		&& path.chars().all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.' | '[' | ']'))
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn list_notes(
	State(state): State<AppState>,
	RequestUser(user_id): RequestUser,
	Query(params): Query<ListParams>,
) -> Result<Json<ListResponse>, ApiError> {
	let view = match params.view.as_deref().map(str::trim).filter(|raw| !raw.is_empty()) {
		Some(raw) => raw.parse::<ViewMode>().map_err(|message| {
			json_error(
				StatusCode::UNPROCESSABLE_ENTITY,
				"invalid_input",
				message,
				Some(vec!["$.view".to_string()]),
			)
		})?,
		None => state.views.get(&user_id),
	};
	let req = ListRequest {
		view,
		q: params.q,
		category: params.category,
		reminder_date: params.reminder_date,
	};
	let response = state.service.list_notes(&user_id, req).await?;

	Ok(Json(response))
}

async fn create_note(
	State(state): State<AppState>,
	RequestUser(user_id): RequestUser,
	payload: Result<Json<NoteRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<NoteView>), ApiError> {
	let note = state.service.create_note(&user_id, json_payload(payload)?).await?;

	Ok((StatusCode::CREATED, Json(note)))
}

async fn get_note(
	State(state): State<AppState>,
	RequestUser(user_id): RequestUser,
	Path(note_id): Path<String>,
) -> Result<Json<NoteView>, ApiError> {
	let note_id = parse_id(&note_id, "Note")?;
	let note = state.service.get_note(&user_id, note_id).await?;

	Ok(Json(note))
}

async fn update_note(
	State(state): State<AppState>,
	RequestUser(user_id): RequestUser,
	Path(note_id): Path<String>,
	payload: Result<Json<NoteRequest>, JsonRejection>,
) -> Result<Json<NoteView>, ApiError> {
	let note_id = parse_id(&note_id, "Note")?;
	let note = state.service.update_note(&user_id, note_id, json_payload(payload)?).await?;

	Ok(Json(note))
}

async fn delete_note(
	State(state): State<AppState>,
	RequestUser(user_id): RequestUser,
	Path(note_id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
	let note_id = parse_id(&note_id, "Note")?;
	let deleted = state.service.delete_note(&user_id, note_id).await?;

	Ok(Json(deleted))
}

async fn get_view(
	State(state): State<AppState>,
	RequestUser(user_id): RequestUser,
) -> Json<ViewBody> {
	Json(ViewBody { view: state.views.get(&user_id) })
}

async fn toggle_view(
	State(state): State<AppState>,
	RequestUser(user_id): RequestUser,
) -> Json<ViewBody> {
	let view = state.views.toggle(&user_id);

	tracing::debug!(user_id, view = view.as_str(), "View mode toggled.");

	Json(ViewBody { view })
}

async fn list_categories(
	State(state): State<AppState>,
	RequestUser(_): RequestUser,
) -> Result<Json<Vec<CategoryView>>, ApiError> {
	Ok(Json(state.service.list_categories().await?))
}

async fn list_groups(
	State(state): State<AppState>,
	RequestUser(user_id): RequestUser,
) -> Result<Json<Vec<GroupView>>, ApiError> {
	Ok(Json(state.service.list_groups_for_user(&user_id).await?))
}

async fn admin_create_category(
	State(state): State<AppState>,
	payload: Result<Json<CreateCategoryRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CategoryView>), ApiError> {
	let category = state.service.create_category(json_payload(payload)?).await?;

	Ok((StatusCode::CREATED, Json(category)))
}

async fn admin_delete_category(
	State(state): State<AppState>,
	Path(category_id): Path<String>,
) -> Result<StatusCode, ApiError> {
	state.service.delete_category(parse_id(&category_id, "Category")?).await?;

	Ok(StatusCode::NO_CONTENT)
}

async fn admin_create_group(
	State(state): State<AppState>,
	payload: Result<Json<CreateGroupRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<GroupView>), ApiError> {
	let group = state.service.create_group(json_payload(payload)?).await?;

	Ok((StatusCode::CREATED, Json(group)))
}

async fn admin_delete_group(
	State(state): State<AppState>,
	Path(group_id): Path<String>,
) -> Result<StatusCode, ApiError> {
	state.service.delete_group(parse_id(&group_id, "Group")?).await?;

	Ok(StatusCode::NO_CONTENT)
}

async fn admin_list_members(
	State(state): State<AppState>,
	Path(group_id): Path<String>,
) -> Result<Json<Vec<MemberView>>, ApiError> {
	Ok(Json(state.service.list_members(parse_id(&group_id, "Group")?).await?))
}

async fn admin_add_member(
	State(state): State<AppState>,
	Path((group_id, user_id)): Path<(String, String)>,
) -> Result<Json<MemberView>, ApiError> {
	let member = state.service.add_member(parse_id(&group_id, "Group")?, &user_id).await?;

	Ok(Json(member))
}

async fn admin_remove_member(
	State(state): State<AppState>,
	Path((group_id, user_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
	state.service.remove_member(parse_id(&group_id, "Group")?, &user_id).await?;

	Ok(StatusCode::NO_CONTENT)
}

async fn admin_register_user(
	State(state): State<AppState>,
	payload: Result<Json<RegisterUserBody>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
	let payload = json_payload(payload)?;

	state.service.register_user(&payload.user_id).await?;

	Ok(StatusCode::NO_CONTENT)
}

async fn admin_remove_user(
	State(state): State<AppState>,
	Path(user_id): Path<String>,
) -> Result<StatusCode, ApiError> {
	state.service.remove_user(&user_id).await?;

	Ok(StatusCode::NO_CONTENT)
}

// An id that does not parse cannot name an existing entity.
fn parse_id(raw: &str, entity: &str) -> Result<Uuid, ApiError> {
	Uuid::parse_str(raw.trim()).map_err(|_| {
		json_error(StatusCode::NOT_FOUND, "not_found", format!("{entity} not found."), None)
	})
}
