use std::collections::HashSet;

use sqlx::PgExecutor;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
	Error, Result,
	models::{GroupMember, NoteGroup},
};

/// The groups `user_id` belongs to right now. Never cached; sharing depends on it being live.
pub async fn groups_of<'e, E>(executor: E, user_id: &str) -> Result<HashSet<Uuid>>
where
	E: PgExecutor<'e>,
{
	let rows: Vec<Uuid> =
		sqlx::query_scalar("SELECT group_id FROM group_members WHERE user_id = $1")
			.bind(user_id)
			.fetch_all(executor)
			.await?;

	Ok(rows.into_iter().collect())
}

pub async fn is_member<'e, E>(executor: E, group_id: Uuid, user_id: &str) -> Result<bool>
where
	E: PgExecutor<'e>,
{
	let exists: bool = sqlx::query_scalar(
		"SELECT EXISTS (SELECT 1 FROM group_members WHERE group_id = $1 AND user_id = $2)",
	)
	.bind(group_id)
	.bind(user_id)
	.fetch_one(executor)
	.await?;

	Ok(exists)
}

pub async fn group_exists<'e, E>(executor: E, group_id: Uuid) -> Result<bool>
where
	E: PgExecutor<'e>,
{
	let exists: bool =
		sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM note_groups WHERE group_id = $1)")
			.bind(group_id)
			.fetch_one(executor)
			.await?;

	Ok(exists)
}

pub async fn insert_group<'e, E>(executor: E, group: &NoteGroup) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query("INSERT INTO note_groups (group_id, name, created_at) VALUES ($1, $2, $3)")
		.bind(group.group_id)
		.bind(group.name.as_str())
		.bind(group.created_at)
		.execute(executor)
		.await
		.map_err(|err| Error::on_write(err, "Group name already exists.", "Group not found."))?;

	Ok(())
}

/// Deletes a group. Notes shared with it become private to their owners.
pub async fn delete_group<'e, E>(executor: E, group_id: Uuid) -> Result<bool>
where
	E: PgExecutor<'e>,
{
	let result = sqlx::query("DELETE FROM note_groups WHERE group_id = $1")
		.bind(group_id)
		.execute(executor)
		.await?;

	Ok(result.rows_affected() > 0)
}

/// Groups `user_id` belongs to, by name.
pub async fn list_groups_for_user<'e, E>(executor: E, user_id: &str) -> Result<Vec<NoteGroup>>
where
	E: PgExecutor<'e>,
{
	let groups = sqlx::query_as(
		"\
SELECT g.group_id, g.name, g.created_at
FROM note_groups g
JOIN group_members m ON m.group_id = g.group_id
WHERE m.user_id = $1
ORDER BY g.name ASC",
	)
	.bind(user_id)
	.fetch_all(executor)
	.await?;

	Ok(groups)
}

/// Adds a member. Returns false when the user already belonged to the group.
pub async fn add_member<'e, E>(
	executor: E,
	group_id: Uuid,
	user_id: &str,
	now: OffsetDateTime,
) -> Result<bool>
where
	E: PgExecutor<'e>,
{
	let result = sqlx::query(
		"\
INSERT INTO group_members (group_id, user_id, joined_at)
VALUES ($1, $2, $3)
ON CONFLICT (group_id, user_id) DO NOTHING",
	)
	.bind(group_id)
	.bind(user_id)
	.bind(now)
	.execute(executor)
	.await
	.map_err(|err| Error::on_write(err, "Membership already exists.", "Group or user not found."))?;

	Ok(result.rows_affected() > 0)
}

pub async fn remove_member<'e, E>(executor: E, group_id: Uuid, user_id: &str) -> Result<bool>
where
	E: PgExecutor<'e>,
{
	let result = sqlx::query("DELETE FROM group_members WHERE group_id = $1 AND user_id = $2")
		.bind(group_id)
		.bind(user_id)
		.execute(executor)
		.await?;

	Ok(result.rows_affected() > 0)
}

pub async fn list_members<'e, E>(executor: E, group_id: Uuid) -> Result<Vec<GroupMember>>
where
	E: PgExecutor<'e>,
{
	let members = sqlx::query_as(
		"\
SELECT group_id, user_id, joined_at
FROM group_members
WHERE group_id = $1
ORDER BY user_id ASC",
	)
	.bind(group_id)
	.fetch_all(executor)
	.await?;

	Ok(members)
}
