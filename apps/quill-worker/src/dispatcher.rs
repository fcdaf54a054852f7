//! Reminder dispatch.
//!
//! Each cycle selects due reminders and handles every note in its own transaction. The note row is
//! claimed with `FOR UPDATE SKIP LOCKED`, the notification is sent while the lock is held, and the
//! reminder is cleared in the same transaction only when the send succeeded. A failed or timed-out
//! send rolls back, so the reminder fires again on the next cycle.

use std::{future::Future, pin::Pin, sync::Arc, time::Duration};

use reqwest::Client;
use time::OffsetDateTime;
use tokio::time::{self as tokio_time, MissedTickBehavior};
use uuid::Uuid;

use crate::{Error, Result};
use quill_config::NotifierKind;
use quill_domain::reminder::ReminderState;
use quill_providers::{ReminderMessage, telegram, webhook};
use quill_storage::{db::Db, reminders};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A channel that delivers reminder messages.
pub trait Notifier
where
	Self: Send + Sync,
{
	fn send<'a>(
		&'a self,
		message: &'a ReminderMessage,
	) -> BoxFuture<'a, quill_providers::Result<()>>;
}

pub struct TelegramNotifier {
	client: Client,
	cfg: quill_config::Telegram,
}
impl Notifier for TelegramNotifier {
	fn send<'a>(
		&'a self,
		message: &'a ReminderMessage,
	) -> BoxFuture<'a, quill_providers::Result<()>> {
		Box::pin(telegram::send(&self.client, &self.cfg, message))
	}
}

pub struct WebhookNotifier {
	client: Client,
	cfg: quill_config::Webhook,
}
impl Notifier for WebhookNotifier {
	fn send<'a>(
		&'a self,
		message: &'a ReminderMessage,
	) -> BoxFuture<'a, quill_providers::Result<()>> {
		Box::pin(webhook::send(&self.client, &self.cfg, message))
	}
}

pub struct WorkerState {
	pub db: Db,
	pub reminders: quill_config::Reminders,
	pub notifier: Arc<dyn Notifier>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
	/// Reminders found due when the cycle started.
	pub due: usize,
	pub delivered: usize,
	pub failed: usize,
	/// Gone, no longer due, or claimed by an overlapping run.
	pub skipped: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
	Finished(ReminderState),
	Skipped,
}

/// Builds the configured notification channel.
pub fn notifier_from_config(cfg: &quill_config::Config) -> Result<Arc<dyn Notifier>> {
	let client = Client::builder()
		.timeout(Duration::from_millis(cfg.reminders.send_timeout_ms))
		.build()
		.map_err(quill_providers::Error::from)?;
	let notifier: Arc<dyn Notifier> = match cfg.notifier.kind {
		NotifierKind::Telegram => {
			let Some(telegram) = cfg.notifier.telegram.clone() else {
				return Err(Error::Config("notifier.telegram is required.".to_string()));
			};

			Arc::new(TelegramNotifier { client, cfg: telegram })
		},
		NotifierKind::Webhook => {
			let Some(webhook) = cfg.notifier.webhook.clone() else {
				return Err(Error::Config("notifier.webhook is required.".to_string()));
			};

			Arc::new(WebhookNotifier { client, cfg: webhook })
		},
	};

	Ok(notifier)
}

/// Runs dispatch cycles every `reminders.interval_secs` until the process stops.
///
/// Cycles never overlap within one process. A failed cycle is logged and the next one runs on
/// schedule.
pub async fn run_dispatcher(state: &WorkerState) {
	let mut interval = tokio_time::interval(Duration::from_secs(state.reminders.interval_secs));

	interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

	loop {
		interval.tick().await;

		match dispatch_due_reminders(state, OffsetDateTime::now_utc()).await {
			Ok(report) if report.due > 0 => {
				tracing::info!(?report, "Reminder dispatch cycle finished.");
			},
			Ok(_) => {},
			Err(err) => {
				tracing::error!(error = %err, "Reminder dispatch cycle failed.");
			},
		}
	}
}

/// Delivers every reminder due at `now`.
///
/// Due notes are read in pages of `reminders.batch_limit` and each one is attempted once per
/// call. A failure on one note never stops the others.
pub async fn dispatch_due_reminders(
	state: &WorkerState,
	now: OffsetDateTime,
) -> Result<DispatchReport> {
	let pool = &state.db.pool;
	let limit = state.reminders.batch_limit;
	let mut report = DispatchReport::default();
	let mut after = None;

	loop {
		let page = state
			.db
			.retrying(move || reminders::due_reminders(pool, now, after, limit))
			.await?;
		let Some(last) = page.last().copied() else {
			break;
		};
		let exhausted = page.len() < limit as usize;

		after = Some(last);
		report.due += page.len();

		for due in page {
			let note_id = due.note_id;

			match dispatch_one(state, note_id, now).await {
				Ok(Outcome::Finished(ReminderState::Delivered)) => report.delivered += 1,
				Ok(Outcome::Finished(_)) => report.failed += 1,
				Ok(Outcome::Skipped) => report.skipped += 1,
				Err(err) => {
					tracing::warn!(%note_id, error = %err, "Reminder dispatch failed.");

					report.failed += 1;
				},
			}
		}

		if exhausted {
			break;
		}
	}

	Ok(report)
}

async fn dispatch_one(state: &WorkerState, note_id: Uuid, now: OffsetDateTime) -> Result<Outcome> {
	let mut tx = state.db.pool.begin().await?;
	let Some(note) = reminders::claim_due_reminder(&mut *tx, note_id, now).await? else {
		tx.rollback().await?;

		return Ok(Outcome::Skipped);
	};
	let Some(reminder_state) = ReminderState::of(note.reminder_at, now) else {
		tx.rollback().await?;

		return Ok(Outcome::Skipped);
	};
	let message = ReminderMessage { note_id: note.note_id, title: note.title, body: note.body };
	let timeout = Duration::from_millis(state.reminders.send_timeout_ms);
	let sent = send_with_timeout(state.notifier.as_ref(), &message, timeout).await;

	if let Err(err) = &sent {
		tracing::warn!(%note_id, error = %err, "Reminder delivery failed. It stays scheduled.");
	}

	let next = reminder_state.after_attempt(sent.is_ok());

	if next.clears_reminder() {
		reminders::clear_reminder(&mut *tx, note_id, OffsetDateTime::now_utc().max(now)).await?;
		tx.commit().await?;

		tracing::debug!(%note_id, "Reminder delivered.");
	} else {
		tx.rollback().await?;
	}

	Ok(Outcome::Finished(next))
}

/// Sends one message, giving up after `timeout`.
pub async fn send_with_timeout(
	notifier: &dyn Notifier,
	message: &ReminderMessage,
	timeout: Duration,
) -> Result<()> {
	match tokio_time::timeout(timeout, notifier.send(message)).await {
		Ok(result) => Ok(result?),
		Err(_) => Err(Error::Timeout(timeout)),
	}
}
