use std::{fmt::Display, future::Future, time::Duration};

use crate::Error;

/// Errors that know whether running the failed operation again may succeed.
pub trait Transient {
	fn is_transient(&self) -> bool;
}
impl Transient for Error {
	fn is_transient(&self) -> bool {
		Error::is_transient(self)
	}
}

/// Bounded retry for transient store failures. Domain errors are never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
	pub attempts: u32,
	pub backoff: Duration,
}
impl RetryPolicy {
	pub fn from_config(cfg: &quill_config::Postgres) -> Self {
		Self {
			attempts: cfg.retry_attempts.max(1),
			backoff: Duration::from_millis(cfg.retry_backoff_ms),
		}
	}
}

/// Runs `op` until it succeeds, fails with a non-transient error, or the attempts are used up.
///
/// The wait before attempt `n + 1` is `n * backoff`.
pub async fn with_retry<T, E, F, Fut>(policy: RetryPolicy, mut op: F) -> Result<T, E>
where
	E: Transient + Display,
	F: FnMut() -> Fut,
	Fut: Future<Output = Result<T, E>>,
{
	let mut attempt = 1;

	loop {
		match op().await {
			Ok(value) => return Ok(value),
			Err(err) if err.is_transient() && attempt < policy.attempts => {
				tracing::warn!(error = %err, attempt, "Transient store error. Retrying.");

				tokio::time::sleep(policy.backoff.saturating_mul(attempt)).await;

				attempt += 1;
			},
			Err(err) => return Err(err),
		}
	}
}
