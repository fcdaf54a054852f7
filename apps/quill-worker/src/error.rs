use std::time::Duration;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("{0}")]
	Config(String),
	#[error(transparent)]
	Storage(#[from] quill_storage::Error),
	#[error(transparent)]
	Delivery(#[from] quill_providers::Error),
	#[error("Notification send timed out after {0:?}.")]
	Timeout(Duration),
}
impl From<sqlx::Error> for Error {
	fn from(err: sqlx::Error) -> Self {
		Self::Storage(quill_storage::Error::Sqlx(err))
	}
}
