use std::{
	collections::HashMap,
	sync::{Arc, Mutex},
};

use quill_domain::view::ViewMode;
use quill_service::QuillService;
use quill_storage::db::Db;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<QuillService>,
	pub views: Arc<ViewSessions>,
}
impl AppState {
	pub async fn new(config: quill_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema().await?;

		Ok(Self::from_service(QuillService::new(config, db)))
	}

	pub fn from_service(service: QuillService) -> Self {
		Self { service: Arc::new(service), views: Arc::new(ViewSessions::default()) }
	}
}

/// Per-user view mode, held in process memory for the lifetime of the server.
#[derive(Debug, Default)]
pub struct ViewSessions {
	modes: Mutex<HashMap<String, ViewMode>>,
}
impl ViewSessions {
	pub fn get(&self, user_id: &str) -> ViewMode {
		let modes = self.modes.lock().unwrap_or_else(|err| err.into_inner());

		modes.get(user_id).copied().unwrap_or_default()
	}

	/// Flips the user's view mode and returns the new one.
	pub fn toggle(&self, user_id: &str) -> ViewMode {
		let mut modes = self.modes.lock().unwrap_or_else(|err| err.into_inner());
		let mode = modes.entry(user_id.to_string()).or_default();

		*mode = mode.toggled();

		*mode
	}
}
