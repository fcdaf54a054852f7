pub mod admin;
pub mod create;
pub mod delete;
pub mod list;
pub mod notes;
pub mod reminder_time;
pub mod update;

mod access;
mod error;

pub use admin::{CategoryView, CreateCategoryRequest, CreateGroupRequest, GroupView, MemberView};
pub use create::NoteRequest;
pub use delete::DeleteResponse;
pub use error::{Error, Result};
pub use list::{ListRequest, ListResponse};
pub use notes::NoteView;

use quill_config::Config;
use quill_storage::db::Db;

/// Longest category title or group name accepted by the admin surface.
pub const MAX_LABEL_CHARS: usize = 100;

pub struct QuillService {
	pub cfg: Config,
	pub db: Db,
}
impl QuillService {
	pub fn new(cfg: Config, db: Db) -> Self {
		Self { cfg, db }
	}
}
