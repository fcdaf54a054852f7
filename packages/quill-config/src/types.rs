use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	#[serde(default)]
	pub notes: Notes,
	#[serde(default)]
	pub reminders: Reminders,
	pub notifier: Notifier,
	#[serde(default)]
	pub security: Security,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub admin_bind: String,
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
	/// Attempts made for an operation that fails with a transient store error. One means no retry.
	#[serde(default = "default_retry_attempts")]
	pub retry_attempts: u32,
	#[serde(default = "default_retry_backoff_ms")]
	pub retry_backoff_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Notes {
	pub max_title_chars: u32,
	pub max_body_chars: u32,
}
impl Default for Notes {
	fn default() -> Self {
		Self { max_title_chars: 100, max_body_chars: 10_000 }
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct Reminders {
	pub interval_secs: u64,
	/// Upper bound for a single notification send, including connect time.
	pub send_timeout_ms: u64,
	/// Page size for the due-reminder scan. One cycle still reads every due reminder.
	pub batch_limit: u32,
}
impl Default for Reminders {
	fn default() -> Self {
		Self { interval_secs: 60, send_timeout_ms: 10_000, batch_limit: 100 }
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct Notifier {
	pub kind: NotifierKind,
	pub telegram: Option<Telegram>,
	pub webhook: Option<Webhook>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifierKind {
	Telegram,
	Webhook,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Telegram {
	#[serde(default = "default_telegram_api_base")]
	pub api_base: String,
	pub bot_token: String,
	pub chat_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Webhook {
	pub url: String,
	pub auth_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Security {
	#[serde(default = "default_true")]
	pub bind_localhost_only: bool,
	/// Request header the upstream auth proxy fills with the authenticated user id.
	#[serde(default = "default_user_header")]
	pub user_header: String,
	pub api_auth_token: Option<String>,
	pub admin_auth_token: Option<String>,
	/// Report forbidden notes as missing instead of forbidden.
	#[serde(default)]
	pub conceal_forbidden_notes: bool,
}
impl Default for Security {
	fn default() -> Self {
		Self {
			bind_localhost_only: true,
			user_header: default_user_header(),
			api_auth_token: None,
			admin_auth_token: None,
			conceal_forbidden_notes: false,
		}
	}
}

fn default_true() -> bool {
	true
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_retry_attempts() -> u32 {
	3
}

fn default_retry_backoff_ms() -> u64 {
	100
}

fn default_telegram_api_base() -> String {
	"https://api.telegram.org".to_string()
}

fn default_user_header() -> String {
	"x-quill-user".to_string()
}
