use reqwest::Client;

use crate::{Error, ReminderMessage, Result};

/// Posts the message as JSON. Any 2xx status counts as delivered.
pub async fn send(
	client: &Client,
	cfg: &quill_config::Webhook,
	message: &ReminderMessage,
) -> Result<()> {
	let res = client
		.post(&cfg.url)
		.headers(crate::bearer_headers(cfg.auth_token.as_deref())?)
		.json(message)
		.send()
		.await?;
	let status = res.status();

	if !status.is_success() {
		return Err(Error::Rejected { message: format!("Webhook responded with {status}.") });
	}

	Ok(())
}
