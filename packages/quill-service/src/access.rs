use std::collections::HashSet;

use sqlx::PgExecutor;
use uuid::Uuid;

use crate::{Error, Result};
use quill_domain::access::{self, NoteAccess, Permission, Requester};
use quill_storage::{membership, models::Note};

pub(crate) fn note_access(note: &Note) -> NoteAccess<'_> {
	NoteAccess { owner_id: note.owner_id.as_deref(), group_id: note.group_id }
}

/// The requester's current groups. Loaded for every check, never cached.
pub(crate) async fn load_groups<'e, E>(executor: E, user_id: &str) -> Result<HashSet<Uuid>>
where
	E: PgExecutor<'e>,
{
	Ok(membership::groups_of(executor, user_id).await?)
}

/// Turns a loaded note into the outcome of an access check.
///
/// A missing note is always `NotFound`. A forbidden one is `AccessDenied`, unless the
/// configuration conceals forbidden notes behind `NotFound`.
pub(crate) fn authorize(
	security: &quill_config::Security,
	permission: Permission,
	requester: &Requester<'_>,
	note: Option<Note>,
) -> Result<Note> {
	let Some(note) = note else {
		return Err(Error::note_not_found());
	};

	if access::allows(permission, requester, &note_access(&note)) {
		return Ok(note);
	}

	tracing::debug!(
		note_id = %note.note_id,
		user_id = requester.user_id,
		?permission,
		"Note access denied."
	);

	if security.conceal_forbidden_notes {
		return Err(Error::note_not_found());
	}

	let message = match permission {
		Permission::Read => "Note is not visible to this user.",
		Permission::Write => "Only the owner may modify this note.",
	};

	Err(Error::AccessDenied { message: message.to_string() })
}
