use serde::{Deserialize, Serialize};

use crate::{NoteView, QuillService, Result};
use quill_domain::{filter::NoteFilter, view::ViewMode};
use quill_storage::queries;

/// Raw listing parameters as they arrive from a query string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListRequest {
	#[serde(default)]
	pub view: ViewMode,
	pub q: Option<String>,
	pub category: Option<String>,
	pub reminder_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse {
	pub view: ViewMode,
	pub notes: Vec<NoteView>,
}

impl QuillService {
	/// Lists the notes `user_id` sees in the requested view, newest first, then filters them.
	///
	/// Filters are parsed before the store is touched, so a malformed filter never costs a query.
	pub async fn list_notes(&self, user_id: &str, req: ListRequest) -> Result<ListResponse> {
		let filter = NoteFilter::parse(
			req.q.as_deref(),
			req.category.as_deref(),
			req.reminder_date.as_deref(),
		)?;
		let notes = self.list_visible(user_id, req.view).await?;

		Ok(ListResponse { view: req.view, notes: filter.apply(notes) })
	}

	/// Every note in `view` for `user_id`, newest first, without filtering.
	pub async fn list_visible(&self, user_id: &str, view: ViewMode) -> Result<Vec<NoteView>> {
		let pool = &self.db.pool;
		let notes = self
			.db
			.retrying(move || async move {
				match view {
					ViewMode::Personal => queries::list_personal_notes(pool, user_id).await,
					ViewMode::Group => queries::list_group_notes(pool, user_id).await,
				}
			})
			.await?;

		Ok(notes.into_iter().map(NoteView::from).collect())
	}
}
