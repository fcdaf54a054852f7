//! Read and write eligibility for a (user, note) pair.
//!
//! A note is owned by its creator. Only the owner may write or delete it. Read access extends to
//! every current member of the note's group, so the caller must pass the requester's memberships
//! as loaded at check time.

use std::collections::HashSet;

use uuid::Uuid;

/// The ownership facts of a note that access decisions depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteAccess<'a> {
	pub owner_id: Option<&'a str>,
	pub group_id: Option<Uuid>,
}

#[derive(Debug, Clone, Copy)]
pub struct Requester<'a> {
	pub user_id: &'a str,
	pub groups: &'a HashSet<Uuid>,
}
impl Requester<'_> {
	pub fn is_member_of(&self, group_id: Uuid) -> bool {
		self.groups.contains(&group_id)
	}

	pub fn owns(&self, note: &NoteAccess<'_>) -> bool {
		note.owner_id == Some(self.user_id)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
	Read,
	/// Also grants delete.
	Write,
}

pub fn can_read(requester: &Requester<'_>, note: &NoteAccess<'_>) -> bool {
	if requester.owns(note) {
		return true;
	}

	note.group_id.map(|group_id| requester.is_member_of(group_id)).unwrap_or(false)
}

pub fn can_write(requester: &Requester<'_>, note: &NoteAccess<'_>) -> bool {
	requester.owns(note)
}

pub fn allows(permission: Permission, requester: &Requester<'_>, note: &NoteAccess<'_>) -> bool {
	match permission {
		Permission::Read => can_read(requester, note),
		Permission::Write => can_write(requester, note),
	}
}
