//! Request authentication.
//!
//! User identity comes from a header set by the upstream auth proxy and is trusted as is. Bearer
//! tokens, when configured, gate the user and admin listeners as a whole.

use axum::{
	body::Body,
	extract::{FromRequestParts, State},
	http::{HeaderMap, Request, StatusCode, header::AUTHORIZATION, request::Parts},
	middleware::Next,
	response::{IntoResponse, Response},
};

use crate::{
	routes::{ApiError, json_error},
	state::AppState,
};

/// The authenticated caller's user id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestUser(pub String);
impl FromRequestParts<AppState> for RequestUser {
	type Rejection = ApiError;

	async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
		let header = state.service.cfg.security.user_header.as_str();
		let Some(raw) = parts.headers.get(header).and_then(|value| value.to_str().ok()) else {
			return Err(unauthorized(format!("Missing {header} header.")));
		};
		let user_id = quill_domain::validate::user_id("$.user_id", raw).map_err(|violation| {
			unauthorized(format!("Invalid {header} header: {}", violation.message))
		})?;

		Ok(Self(user_id))
	}
}

pub async fn api_auth(State(state): State<AppState>, req: Request<Body>, next: Next) -> Response {
	let expected = state.service.cfg.security.api_auth_token.as_deref();

	if !is_authorized(req.headers(), expected) {
		return unauthorized("A valid bearer token is required.").into_response();
	}

	next.run(req).await
}

pub async fn admin_auth(State(state): State<AppState>, req: Request<Body>, next: Next) -> Response {
	let expected = state.service.cfg.security.admin_auth_token.as_deref();

	if !is_authorized(req.headers(), expected) {
		return unauthorized("A valid admin bearer token is required.").into_response();
	}

	next.run(req).await
}

fn is_authorized(headers: &HeaderMap, expected: Option<&str>) -> bool {
	match expected {
		None => true,
		Some(token) => read_bearer_token(headers).is_some_and(|presented| presented == token),
	}
}

fn read_bearer_token(headers: &HeaderMap) -> Option<&str> {
	let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
	let token = value.strip_prefix("Bearer ")?.trim();

	if token.is_empty() { None } else { Some(token) }
}

fn unauthorized(message: impl Into<String>) -> ApiError {
	json_error(StatusCode::UNAUTHORIZED, "unauthorized", message, None)
}
