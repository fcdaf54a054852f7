use std::{
	fmt::{Display, Formatter},
	str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::access::{NoteAccess, Requester};

/// Which slice of the visible notes a listing shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
	/// Private notes owned by the requester.
	#[default]
	Personal,
	/// Notes shared with any group the requester currently belongs to, whoever owns them.
	Group,
}
impl ViewMode {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Personal => "personal",
			Self::Group => "group",
		}
	}

	pub fn toggled(self) -> Self {
		match self {
			Self::Personal => Self::Group,
			Self::Group => Self::Personal,
		}
	}

	/// Whether `note` belongs in this view for `requester`.
	pub fn includes(self, requester: &Requester<'_>, note: &NoteAccess<'_>) -> bool {
		match self {
			Self::Personal => note.group_id.is_none() && requester.owns(note),
			Self::Group => note.group_id.map(|id| requester.is_member_of(id)).unwrap_or(false),
		}
	}
}

impl Display for ViewMode {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		self.as_str().fmt(f)
	}
}

impl FromStr for ViewMode {
	type Err = String;

	fn from_str(raw: &str) -> Result<Self, Self::Err> {
		match raw.trim().to_ascii_lowercase().as_str() {
			"personal" => Ok(Self::Personal),
			"group" => Ok(Self::Group),
			other => Err(format!("Unknown view mode {other:?}; expected personal or group.")),
		}
	}
}
