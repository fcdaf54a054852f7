use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Lifecycle of a single note reminder as seen by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReminderState {
	/// Set and still in the future.
	Scheduled,
	/// Set and at or before the cycle time.
	Due,
	/// Sent; the reminder field is cleared.
	Delivered,
	/// Sending failed; the reminder stays set for the next cycle.
	Failed,
}
impl ReminderState {
	/// The state of a stored reminder at `now`. `None` means no reminder is set.
	pub fn of(reminder_at: Option<OffsetDateTime>, now: OffsetDateTime) -> Option<Self> {
		reminder_at.map(|at| if is_due(at, now) { Self::Due } else { Self::Scheduled })
	}

	/// Applies a delivery attempt to a due reminder. Other states are returned unchanged.
	pub fn after_attempt(self, delivered: bool) -> Self {
		match (self, delivered) {
			(Self::Due, true) => Self::Delivered,
			(Self::Due, false) => Self::Failed,
			(state, _) => state,
		}
	}

	/// Whether the stored reminder must be cleared when entering this state.
	pub fn clears_reminder(self) -> bool {
		matches!(self, Self::Delivered)
	}
}

pub fn is_due(reminder_at: OffsetDateTime, now: OffsetDateTime) -> bool {
	reminder_at <= now
}
