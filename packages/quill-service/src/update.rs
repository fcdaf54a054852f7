use time::OffsetDateTime;
use uuid::Uuid;

use crate::{NoteRequest, NoteView, QuillService, Result, access, create};
use quill_domain::{
	access::{Permission, Requester},
	validate::NoteText,
};
use quill_storage::{
	models::{self, Note},
	queries,
};

impl QuillService {
	/// Replaces title, body, category, group, and reminder of a note the caller owns.
	///
	/// `updated_at` always advances, even when nothing else changes. `created_at` and the owner
	/// never change.
	pub async fn update_note(
		&self,
		user_id: &str,
		note_id: Uuid,
		req: NoteRequest,
	) -> Result<NoteView> {
		let text = create::validated_text(&self.cfg.notes, &req.title, &req.body)?;
		let now = models::stored_instant(OffsetDateTime::now_utc());
		let (text, req) = (&text, &req);
		let note = self
			.db
			.retrying(move || self.update_note_once(user_id, note_id, text, req, now))
			.await?;

		tracing::debug!(note_id = %note.note_id, user_id, "Note updated.");

		Ok(note.into())
	}

	async fn update_note_once(
		&self,
		user_id: &str,
		note_id: Uuid,
		text: &NoteText,
		req: &NoteRequest,
		now: OffsetDateTime,
	) -> Result<Note> {
		let mut tx = self.db.pool.begin().await?;
		let locked = queries::fetch_note_for_update(&mut *tx, note_id).await?;
		let groups = access::load_groups(&mut *tx, user_id).await?;
		let requester = Requester { user_id, groups: &groups };
		let mut note =
			access::authorize(&self.cfg.security, Permission::Write, &requester, locked)?;

		create::check_references(&mut *tx, user_id, req.category_id, req.group_id).await?;

		note.title = text.title.clone();
		note.body = text.body.clone();
		note.category_id = req.category_id;
		note.group_id = req.group_id;
		note.reminder_at = req.reminder_at.map(models::stored_instant);
		note.updated_at = now.max(note.updated_at);

		queries::update_note(&mut *tx, &note).await?;

		tx.commit().await?;

		Ok(note)
	}
}
