use sqlx::PgExecutor;
use uuid::Uuid;

use crate::{Error, Result, models::Note};

const NOTE_COLUMNS: &str = "\
note_id, title, body, category_id, group_id, owner_id, reminder_at, created_at, updated_at";

pub async fn insert_note<'e, E>(executor: E, note: &Note) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query(
		"\
INSERT INTO notes (
	note_id,
	title,
	body,
	category_id,
	group_id,
	owner_id,
	reminder_at,
	created_at,
	updated_at
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
	)
	.bind(note.note_id)
	.bind(note.title.as_str())
	.bind(note.body.as_str())
	.bind(note.category_id)
	.bind(note.group_id)
	.bind(note.owner_id.as_deref())
	.bind(note.reminder_at)
	.bind(note.created_at)
	.bind(note.updated_at)
	.execute(executor)
	.await
	.map_err(|err| Error::on_write(err, "Note already exists.", "Referenced entity not found."))?;

	Ok(())
}

pub async fn fetch_note<'e, E>(executor: E, note_id: Uuid) -> Result<Option<Note>>
where
	E: PgExecutor<'e>,
{
	let sql = format!("SELECT {NOTE_COLUMNS} FROM notes WHERE note_id = $1");
	let note = sqlx::query_as(&sql).bind(note_id).fetch_optional(executor).await?;

	Ok(note)
}

/// Loads a note and locks its row until the surrounding transaction ends.
pub async fn fetch_note_for_update<'e, E>(executor: E, note_id: Uuid) -> Result<Option<Note>>
where
	E: PgExecutor<'e>,
{
	let sql = format!("SELECT {NOTE_COLUMNS} FROM notes WHERE note_id = $1 FOR UPDATE");
	let note = sqlx::query_as(&sql).bind(note_id).fetch_optional(executor).await?;

	Ok(note)
}

/// Writes every mutable column. `created_at` and `owner_id` are never touched.
pub async fn update_note<'e, E>(executor: E, note: &Note) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query(
		"\
UPDATE notes
SET
	title = $1,
	body = $2,
	category_id = $3,
	group_id = $4,
	reminder_at = $5,
	updated_at = $6
WHERE note_id = $7",
	)
	.bind(note.title.as_str())
	.bind(note.body.as_str())
	.bind(note.category_id)
	.bind(note.group_id)
	.bind(note.reminder_at)
	.bind(note.updated_at)
	.bind(note.note_id)
	.execute(executor)
	.await
	.map_err(|err| Error::on_write(err, "Note update conflicts.", "Referenced entity not found."))?;

	Ok(())
}

pub async fn delete_note<'e, E>(executor: E, note_id: Uuid) -> Result<bool>
where
	E: PgExecutor<'e>,
{
	let result = sqlx::query("DELETE FROM notes WHERE note_id = $1")
		.bind(note_id)
		.execute(executor)
		.await?;

	Ok(result.rows_affected() > 0)
}

/// Private notes owned by `user_id`, newest first.
pub async fn list_personal_notes<'e, E>(executor: E, user_id: &str) -> Result<Vec<Note>>
where
	E: PgExecutor<'e>,
{
	let sql = format!(
		"\
SELECT {NOTE_COLUMNS}
FROM notes
WHERE owner_id = $1 AND group_id IS NULL
ORDER BY created_at DESC, note_id DESC"
	);
	let notes = sqlx::query_as(&sql).bind(user_id).fetch_all(executor).await?;

	Ok(notes)
}

/// Notes shared with any group `user_id` currently belongs to, newest first.
pub async fn list_group_notes<'e, E>(executor: E, user_id: &str) -> Result<Vec<Note>>
where
	E: PgExecutor<'e>,
{
	let sql = format!(
		"\
SELECT {NOTE_COLUMNS}
FROM notes
WHERE group_id IN (SELECT group_id FROM group_members WHERE user_id = $1)
ORDER BY created_at DESC, note_id DESC"
	);
	let notes = sqlx::query_as(&sql).bind(user_id).fetch_all(executor).await?;

	Ok(notes)
}

/// Registers a user id. Existing users are left untouched.
pub async fn ensure_user<'e, E>(executor: E, user_id: &str) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query("INSERT INTO users (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
		.bind(user_id)
		.execute(executor)
		.await?;

	Ok(())
}

/// Removes a user. Their notes persist with a null owner and their memberships are dropped.
pub async fn delete_user<'e, E>(executor: E, user_id: &str) -> Result<bool>
where
	E: PgExecutor<'e>,
{
	let result =
		sqlx::query("DELETE FROM users WHERE user_id = $1").bind(user_id).execute(executor).await?;

	Ok(result.rows_affected() > 0)
}
