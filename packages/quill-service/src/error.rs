use quill_domain::validate::FieldViolation;
use quill_storage::retry::Transient;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Access denied: {message}")]
	AccessDenied { message: String },
	#[error("Invalid input: {message}")]
	InvalidInput { message: String, fields: Vec<String> },
	#[error("Invalid group: {message}")]
	InvalidGroup { message: String },
	#[error("Conflict: {message}")]
	Conflict { message: String },
	#[error("Storage error: {0}")]
	Storage(#[source] quill_storage::Error),
}
impl Error {
	pub(crate) fn note_not_found() -> Self {
		Self::NotFound { message: "Note not found.".to_string() }
	}

	pub(crate) fn invalid(violations: Vec<FieldViolation>) -> Self {
		let message = violations.iter().map(ToString::to_string).collect::<Vec<_>>().join(" ");
		let fields = violations.into_iter().map(|v| v.field.to_string()).collect();

		Self::InvalidInput { message, fields }
	}
}

impl Transient for Error {
	fn is_transient(&self) -> bool {
		matches!(self, Self::Storage(err) if err.is_transient())
	}
}

impl From<FieldViolation> for Error {
	fn from(violation: FieldViolation) -> Self {
		Self::invalid(vec![violation])
	}
}

impl From<sqlx::Error> for Error {
	fn from(err: sqlx::Error) -> Self {
		Self::Storage(quill_storage::Error::Sqlx(err))
	}
}

impl From<quill_storage::Error> for Error {
	fn from(err: quill_storage::Error) -> Self {
		match err {
			quill_storage::Error::NotFound(message) => Self::NotFound { message },
			quill_storage::Error::Conflict(message) => Self::Conflict { message },
			other => Self::Storage(other),
		}
	}
}
