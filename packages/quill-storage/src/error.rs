const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Sqlx(#[from] sqlx::Error),
	#[error("Not found: {0}")]
	NotFound(String),
	#[error("Conflict: {0}")]
	Conflict(String),
}
impl Error {
	/// Whether retrying the same operation may succeed without any change on the caller's side.
	pub fn is_transient(&self) -> bool {
		let Self::Sqlx(err) = self else {
			return false;
		};

		match err {
			sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut => true,
			sqlx::Error::Database(db_err) => matches!(
				db_err.code().as_deref(),
				Some(SERIALIZATION_FAILURE) | Some(DEADLOCK_DETECTED)
			),
			_ => false,
		}
	}

	/// Maps constraint violations of a write to domain errors and keeps everything else as is.
	pub(crate) fn on_write(err: sqlx::Error, conflict: &str, missing: &str) -> Self {
		if let sqlx::Error::Database(db_err) = &err {
			match db_err.code().as_deref() {
				Some(UNIQUE_VIOLATION) => return Self::Conflict(conflict.to_string()),
				Some(FOREIGN_KEY_VIOLATION) => return Self::NotFound(missing.to_string()),
				_ => {},
			}
		}

		Self::Sqlx(err)
	}
}
