use std::fmt::{Display, Formatter};

/// A single rejected input field, addressed by JSON path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
	pub field: &'static str,
	pub message: String,
}
impl FieldViolation {
	pub fn new(field: &'static str, message: impl Into<String>) -> Self {
		Self { field, message: message.into() }
	}
}

impl Display for FieldViolation {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{} {}", self.field, self.message)
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteText {
	pub title: String,
	pub body: String,
}

/// Checks title and body against the configured limits.
///
/// The title is stored trimmed. The body is stored as written but must contain something other
/// than whitespace. Every violation is reported, not just the first.
pub fn note_text(
	title: &str,
	body: &str,
	limits: &quill_config::Notes,
) -> Result<NoteText, Vec<FieldViolation>> {
	let mut violations = Vec::new();
	let title = title.trim();

	if title.is_empty() {
		violations.push(FieldViolation::new("$.title", "must not be empty."));
	} else if title.chars().count() > limits.max_title_chars as usize {
		violations.push(FieldViolation::new(
			"$.title",
			format!("must be at most {} characters.", limits.max_title_chars),
		));
	}
	if body.trim().is_empty() {
		violations.push(FieldViolation::new("$.body", "must not be empty."));
	} else if body.chars().count() > limits.max_body_chars as usize {
		violations.push(FieldViolation::new(
			"$.body",
			format!("must be at most {} characters.", limits.max_body_chars),
		));
	}

	if violations.is_empty() {
		Ok(NoteText { title: title.to_string(), body: body.to_string() })
	} else {
		Err(violations)
	}
}

/// Validates an administrative label such as a category title or group name.
pub fn label(field: &'static str, value: &str, max_chars: usize) -> Result<String, FieldViolation> {
	let value = value.trim();

	if value.is_empty() {
		return Err(FieldViolation::new(field, "must not be empty."));
	}
	if value.chars().count() > max_chars {
		return Err(FieldViolation::new(field, format!("must be at most {max_chars} characters.")));
	}

	Ok(value.to_string())
}

/// Validates an opaque user id handed over by the authentication layer.
pub fn user_id(field: &'static str, value: &str) -> Result<String, FieldViolation> {
	let value = value.trim();

	if value.is_empty() {
		return Err(FieldViolation::new(field, "must not be empty."));
	}
	if value.len() > 255 || value.chars().any(char::is_control) {
		return Err(FieldViolation::new(
			field,
			"must be at most 255 bytes without control characters.",
		));
	}

	Ok(value.to_string())
}
