pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("{0}")]
	Message(String),
	#[error("Test database operation failed: {0}")]
	Sqlx(#[from] sqlx::Error),
}
