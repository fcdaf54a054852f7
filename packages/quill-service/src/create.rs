use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, Postgres, Transaction};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Error, NoteView, QuillService, Result};
use quill_domain::validate::{self, NoteText};
use quill_storage::{
	categories, membership,
	models::{self, Note},
	queries,
};

/// Note fields supplied on create and, as a full replacement, on update.
///
/// Omitted optional fields are left empty on create and cleared on update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NoteRequest {
	pub title: String,
	pub body: String,
	#[serde(default)]
	pub category_id: Option<Uuid>,
	#[serde(default)]
	pub group_id: Option<Uuid>,
	#[serde(default, with = "crate::reminder_time")]
	pub reminder_at: Option<OffsetDateTime>,
}

impl QuillService {
	pub async fn create_note(&self, user_id: &str, req: NoteRequest) -> Result<NoteView> {
		let text = validated_text(&self.cfg.notes, &req.title, &req.body)?;
		let now = models::stored_instant(OffsetDateTime::now_utc());
		let note = Note {
			note_id: Uuid::new_v4(),
			title: text.title,
			body: text.body,
			category_id: req.category_id,
			group_id: req.group_id,
			owner_id: Some(user_id.to_string()),
			reminder_at: req.reminder_at.map(models::stored_instant),
			created_at: now,
			updated_at: now,
		};
		let note_ref = &note;

		self.db.retrying(move || self.create_note_once(user_id, note_ref)).await?;

		tracing::debug!(note_id = %note.note_id, user_id, "Note created.");

		Ok(note.into())
	}

	async fn create_note_once(&self, user_id: &str, note: &Note) -> Result<()> {
		let mut tx: Transaction<'_, Postgres> = self.db.pool.begin().await?;

		queries::ensure_user(&mut *tx, user_id).await?;
		check_references(&mut *tx, user_id, note.category_id, note.group_id).await?;
		queries::insert_note(&mut *tx, note).await?;

		tx.commit().await?;

		Ok(())
	}
}

/// Verifies the category and group a note points at.
///
/// Both must exist. Sharing additionally requires the author to belong to the group right now.
pub(crate) async fn check_references(
	conn: &mut PgConnection,
	user_id: &str,
	category_id: Option<Uuid>,
	group_id: Option<Uuid>,
) -> Result<()> {
	if let Some(category_id) = category_id
		&& !categories::category_exists(&mut *conn, category_id).await?
	{
		return Err(Error::NotFound { message: format!("Category {category_id} not found.") });
	}
	if let Some(group_id) = group_id {
		if !membership::group_exists(&mut *conn, group_id).await? {
			return Err(Error::NotFound { message: format!("Group {group_id} not found.") });
		}
		if !membership::is_member(&mut *conn, group_id, user_id).await? {
			return Err(Error::InvalidGroup {
				message: "Notes can only be shared with a group the author belongs to.".to_string(),
			});
		}
	}

	Ok(())
}

pub(crate) fn validated_text(
	cfg: &quill_config::Notes,
	title: &str,
	body: &str,
) -> Result<NoteText> {
	validate::note_text(title, body, cfg).map_err(Error::invalid)
}
