use reqwest::Client;
use serde_json::Value;

use crate::{Error, ReminderMessage, Result};

pub async fn send(
	client: &Client,
	cfg: &quill_config::Telegram,
	message: &ReminderMessage,
) -> Result<()> {
	let url = format!("{}/bot{}/sendMessage", cfg.api_base, cfg.bot_token);
	let body = serde_json::json!({
		"chat_id": cfg.chat_id,
		"text": render_html(message),
		"parse_mode": "HTML",
	});
	let res = client.post(url).json(&body).send().await?;
	let status = res.status();
	let json: Value = res.json().await?;

	check_response(status.is_success(), &json)
}

/// Longest `sendMessage` text the Bot API accepts, counted in UTF-16 code units.
pub const MAX_TEXT_LEN: usize = 4096;
/// Share of [`MAX_TEXT_LEN`] a title may take. The body gets the rest.
const MAX_TITLE_LEN: usize = 256;
const ELLIPSIS: char = '…';

/// Renders the message for Telegram's HTML parse mode, cut to fit [`MAX_TEXT_LEN`].
///
/// Cuts fall between whole characters or entities and are marked with an ellipsis.
pub fn render_html(message: &ReminderMessage) -> String {
	let mut out = String::from("📌 <b>");

	push_escaped(&mut out, &message.title, MAX_TITLE_LEN);
	out.push_str("</b>\n\n");

	let budget = MAX_TEXT_LEN.saturating_sub(utf16_len(&out));

	push_escaped(&mut out, &message.body, budget);

	out
}

pub fn escape_html(raw: &str) -> String {
	let mut out = String::with_capacity(raw.len());

	for ch in raw.chars() {
		match entity(ch) {
			Some(entity) => out.push_str(entity),
			None => out.push(ch),
		}
	}

	out
}

fn entity(ch: char) -> Option<&'static str> {
	match ch {
		'&' => Some("&amp;"),
		'<' => Some("&lt;"),
		'>' => Some("&gt;"),
		'"' => Some("&quot;"),
		_ => None,
	}
}

fn utf16_len(text: &str) -> usize {
	text.chars().map(char::len_utf16).sum()
}

// Appends `raw` escaped. Past `budget` code units the tail is dropped for an ellipsis.
fn push_escaped(out: &mut String, raw: &str, budget: usize) {
	let escaped = escape_html(raw);

	if utf16_len(&escaped) <= budget {
		out.push_str(&escaped);

		return;
	}

	let limit = budget.saturating_sub(ELLIPSIS.len_utf16());
	let mut used = 0;

	for ch in raw.chars() {
		let piece = entity(ch);
		let width = piece.map_or(ch.len_utf16(), str::len);

		if used + width > limit {
			break;
		}

		used += width;

		match piece {
			Some(entity) => out.push_str(entity),
			None => out.push(ch),
		}
	}

	out.push(ELLIPSIS);
}

// The Bot API reports failures both through the status code and the `ok` flag.
fn check_response(status_ok: bool, json: &Value) -> Result<()> {
	if status_ok && json.get("ok").and_then(Value::as_bool) == Some(true) {
		return Ok(());
	}

	let description =
		json.get("description").and_then(Value::as_str).unwrap_or("no description").to_string();

	Err(Error::Rejected { message: format!("Telegram rejected the message: {description}.") })
}
