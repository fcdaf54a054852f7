//! Store access for the reminder dispatcher.
//!
//! The dispatcher pages through due notes without locking, then claims each note in its own
//! transaction with `FOR UPDATE SKIP LOCKED`. A claimed note stays locked until the send outcome
//! is known, so overlapping dispatcher runs never deliver the same reminder twice.

use sqlx::PgExecutor;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
	Result,
	models::{DueReminder, Note},
};

/// One page of notes whose reminder is at or before `now`, ordered by `(reminder_at, note_id)`.
///
/// Pass the last row of the previous page as `after` to continue the scan. Rows whose delivery
/// failed keep their place in the order, so paging past them reaches every later reminder.
pub async fn due_reminders<'e, E>(
	executor: E,
	now: OffsetDateTime,
	after: Option<DueReminder>,
	limit: u32,
) -> Result<Vec<DueReminder>>
where
	E: PgExecutor<'e>,
{
	let rows = sqlx::query_as(
		"\
SELECT note_id, reminder_at
FROM notes
WHERE reminder_at IS NOT NULL
	AND reminder_at <= $1
	AND ($2::timestamptz IS NULL OR (reminder_at, note_id) > ($2::timestamptz, $3::uuid))
ORDER BY reminder_at ASC, note_id ASC
LIMIT $4",
	)
	.bind(now)
	.bind(after.map(|cursor| cursor.reminder_at))
	.bind(after.map(|cursor| cursor.note_id))
	.bind(i64::from(limit))
	.fetch_all(executor)
	.await?;

	Ok(rows)
}

/// Re-checks that a note is still due and locks it.
///
/// Returns `None` when the note is gone, its reminder was cleared or moved into the future, or
/// another transaction holds the row.
pub async fn claim_due_reminder<'e, E>(
	executor: E,
	note_id: Uuid,
	now: OffsetDateTime,
) -> Result<Option<Note>>
where
	E: PgExecutor<'e>,
{
	let note = sqlx::query_as(
		"\
SELECT note_id, title, body, category_id, group_id, owner_id, reminder_at, created_at, updated_at
FROM notes
WHERE note_id = $1 AND reminder_at IS NOT NULL AND reminder_at <= $2
FOR UPDATE SKIP LOCKED",
	)
	.bind(note_id)
	.bind(now)
	.fetch_optional(executor)
	.await?;

	Ok(note)
}

/// Clears a delivered reminder. Must run in the transaction that claimed the note.
pub async fn clear_reminder<'e, E>(executor: E, note_id: Uuid, now: OffsetDateTime) -> Result<bool>
where
	E: PgExecutor<'e>,
{
	let result = sqlx::query(
		"\
UPDATE notes
SET reminder_at = NULL, updated_at = $1
WHERE note_id = $2 AND reminder_at IS NOT NULL",
	)
	.bind(now)
	.bind(note_id)
	.execute(executor)
	.await?;

	Ok(result.rows_affected() > 0)
}
