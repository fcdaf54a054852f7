use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{QuillService, Result, access};
use quill_domain::access::{Permission, Requester};
use quill_storage::queries;

/// What was deleted, for confirmation messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
	pub note_id: Uuid,
	pub title: String,
}

impl QuillService {
	pub async fn delete_note(&self, user_id: &str, note_id: Uuid) -> Result<DeleteResponse> {
		let deleted = self.db.retrying(move || self.delete_note_once(user_id, note_id)).await?;

		tracing::debug!(note_id = %deleted.note_id, user_id, "Note deleted.");

		Ok(deleted)
	}

	async fn delete_note_once(&self, user_id: &str, note_id: Uuid) -> Result<DeleteResponse> {
		let mut tx = self.db.pool.begin().await?;
		let locked = queries::fetch_note_for_update(&mut *tx, note_id).await?;
		let groups = access::load_groups(&mut *tx, user_id).await?;
		let requester = Requester { user_id, groups: &groups };
		let note = access::authorize(&self.cfg.security, Permission::Write, &requester, locked)?;

		queries::delete_note(&mut *tx, note.note_id).await?;

		tx.commit().await?;

		Ok(DeleteResponse { note_id: note.note_id, title: note.title })
	}
}
