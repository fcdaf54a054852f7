mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, Notes, Notifier, NotifierKind, Postgres, Reminders, Security, Service, Storage,
	Telegram, Webhook,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw =
		fs::read_to_string(path).map_err(|err| Error::Read { path: path.to_path_buf(), source: err })?;

	parse(path, &raw)
}

/// Parses, normalizes, and validates a config document. `path` is only used for error reporting.
pub fn parse(path: &Path, raw: &str) -> Result<Config> {
	let mut cfg: Config = toml::from_str(raw)
		.map_err(|err| Error::Parse { path: path.to_path_buf(), source: Box::new(err) })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::invalid("service.http_bind", "must be non-empty."));
	}
	if cfg.service.admin_bind.trim().is_empty() {
		return Err(Error::invalid("service.admin_bind", "must be non-empty."));
	}
	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::invalid("storage.postgres.dsn", "must be non-empty."));
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::invalid("storage.postgres.pool_max_conns", "must be greater than zero."));
	}
	if cfg.storage.postgres.retry_attempts == 0 {
		return Err(Error::invalid("storage.postgres.retry_attempts", "must be greater than zero."));
	}
	if cfg.notes.max_title_chars == 0 {
		return Err(Error::invalid("notes.max_title_chars", "must be greater than zero."));
	}
	if cfg.notes.max_body_chars == 0 {
		return Err(Error::invalid("notes.max_body_chars", "must be greater than zero."));
	}
	if cfg.reminders.interval_secs == 0 {
		return Err(Error::invalid("reminders.interval_secs", "must be greater than zero."));
	}
	if cfg.reminders.send_timeout_ms == 0 {
		return Err(Error::invalid("reminders.send_timeout_ms", "must be greater than zero."));
	}
	if cfg.reminders.batch_limit == 0 {
		return Err(Error::invalid("reminders.batch_limit", "must be greater than zero."));
	}

	validate_notifier(&cfg.notifier)?;

	let header = cfg.security.user_header.as_str();

	if header.is_empty()
		|| !header.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
	{
		return Err(Error::invalid(
			"security.user_header",
			"must be a non-empty lowercase header name.",
		));
	}

	Ok(())
}

fn validate_notifier(notifier: &Notifier) -> Result<()> {
	match notifier.kind {
		NotifierKind::Telegram => {
			let Some(telegram) = notifier.telegram.as_ref() else {
				return Err(Error::invalid(
					"notifier.telegram",
					"must be present when notifier.kind is telegram.",
				));
			};

			for (key, value) in [
				("notifier.telegram.api_base", &telegram.api_base),
				("notifier.telegram.bot_token", &telegram.bot_token),
				("notifier.telegram.chat_id", &telegram.chat_id),
			] {
				if value.trim().is_empty() {
					return Err(Error::invalid(key, "must be non-empty."));
				}
			}
		},
		NotifierKind::Webhook => {
			let Some(webhook) = notifier.webhook.as_ref() else {
				return Err(Error::invalid(
					"notifier.webhook",
					"must be present when notifier.kind is webhook.",
				));
			};

			if !webhook.url.starts_with("http://") && !webhook.url.starts_with("https://") {
				return Err(Error::invalid("notifier.webhook.url", "must be an http(s) URL."));
			}
		},
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.security.user_header = cfg.security.user_header.trim().to_ascii_lowercase();

	for token in [&mut cfg.security.api_auth_token, &mut cfg.security.admin_auth_token] {
		if token.as_deref().map(|value| value.trim().is_empty()).unwrap_or(false) {
			*token = None;
		}
	}

	if let Some(webhook) = cfg.notifier.webhook.as_mut()
		&& webhook.auth_token.as_deref().map(|value| value.trim().is_empty()).unwrap_or(false)
	{
		webhook.auth_token = None;
	}
	if let Some(telegram) = cfg.notifier.telegram.as_mut() {
		let trimmed = telegram.api_base.trim_end_matches('/').len();

		telegram.api_base.truncate(trimmed);
	}
}
