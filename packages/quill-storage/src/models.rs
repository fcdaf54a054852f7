use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Note {
	pub note_id: Uuid,
	pub title: String,
	pub body: String,
	pub category_id: Option<Uuid>,
	pub group_id: Option<Uuid>,
	pub owner_id: Option<String>,
	pub reminder_at: Option<OffsetDateTime>,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Category {
	pub category_id: Uuid,
	pub title: String,
	pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct NoteGroup {
	pub group_id: Uuid,
	pub name: String,
	pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct GroupMember {
	pub group_id: Uuid,
	pub user_id: String,
	pub joined_at: OffsetDateTime,
}

/// A due reminder as seen by the dispatcher scan. Doubles as the cursor for the next page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct DueReminder {
	pub note_id: Uuid,
	pub reminder_at: OffsetDateTime,
}

/// `at` truncated to the microsecond precision a `timestamptz` column keeps.
///
/// Values returned to callers must match what a later read yields.
pub fn stored_instant(at: OffsetDateTime) -> OffsetDateTime {
	at.replace_microsecond(at.microsecond()).unwrap_or(at)
}
