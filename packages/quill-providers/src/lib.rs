pub mod telegram;
pub mod webhook;

mod error;

pub use error::{Error, Result};

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Serialize;
use uuid::Uuid;

/// What a reminder delivers. It does not depend on who receives it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReminderMessage {
	pub note_id: Uuid,
	pub title: String,
	pub body: String,
}

pub fn bearer_headers(token: Option<&str>) -> Result<HeaderMap> {
	let mut headers = HeaderMap::new();

	if let Some(token) = token {
		let mut value = HeaderValue::from_str(&format!("Bearer {token}"))?;

		value.set_sensitive(true);
		headers.insert(AUTHORIZATION, value);
	}

	Ok(headers)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn bearer_headers_are_optional() {
		assert!(bearer_headers(None).expect("empty headers").is_empty());

		let headers = bearer_headers(Some("secret")).expect("headers");

		assert_eq!(headers.get(AUTHORIZATION).expect("auth header"), "Bearer secret");
	}

	#[test]
	fn message_serializes_flat() {
		let note_id = Uuid::nil();
		let json = serde_json::to_value(ReminderMessage {
			note_id,
			title: "Dentist".to_string(),
			body: "10am".to_string(),
		})
		.expect("serialize");

		assert_eq!(
			json,
			serde_json::json!({ "note_id": note_id, "title": "Dentist", "body": "10am" })
		);
	}
}
