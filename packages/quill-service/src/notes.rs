use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{QuillService, Result, access};
use quill_domain::{
	access::{Permission, Requester},
	filter::Filterable,
};
use quill_storage::{models::Note, queries};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteView {
	pub note_id: Uuid,
	pub title: String,
	pub body: String,
	pub category_id: Option<Uuid>,
	pub group_id: Option<Uuid>,
	pub owner_id: Option<String>,
	#[serde(with = "crate::reminder_time")]
	pub reminder_at: Option<OffsetDateTime>,
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
	#[serde(with = "time::serde::rfc3339")]
	pub updated_at: OffsetDateTime,
}
impl From<Note> for NoteView {
	fn from(note: Note) -> Self {
		Self {
			note_id: note.note_id,
			title: note.title,
			body: note.body,
			category_id: note.category_id,
			group_id: note.group_id,
			owner_id: note.owner_id,
			reminder_at: note.reminder_at,
			created_at: note.created_at,
			updated_at: note.updated_at,
		}
	}
}

impl Filterable for NoteView {
	fn title(&self) -> &str {
		&self.title
	}

	fn category_id(&self) -> Option<Uuid> {
		self.category_id
	}

	fn reminder_at(&self) -> Option<OffsetDateTime> {
		self.reminder_at
	}
}

impl QuillService {
	pub async fn get_note(&self, user_id: &str, note_id: Uuid) -> Result<NoteView> {
		self.db.retrying(move || self.get_note_once(user_id, note_id)).await
	}

	async fn get_note_once(&self, user_id: &str, note_id: Uuid) -> Result<NoteView> {
		let note = queries::fetch_note(&self.db.pool, note_id).await?;
		let groups = access::load_groups(&self.db.pool, user_id).await?;
		let requester = Requester { user_id, groups: &groups };
		let note = access::authorize(&self.cfg.security, Permission::Read, &requester, note)?;

		Ok(note.into())
	}
}
