//! Listing filters: title search, category, and reminder date.
//!
//! Filters are conjunctive and each absent or blank filter is a no-op. Applying a filter never
//! reorders its input, so a listing sorted newest-first stays sorted.

use time::{
	Date, OffsetDateTime, PrimitiveDateTime, UtcOffset, format_description::well_known::Rfc3339,
	macros::format_description,
};
use uuid::Uuid;

use crate::validate::FieldViolation;

pub const MAX_SEARCH_QUERY_CHARS: usize = 100;

/// The filterable projection of a note.
pub trait Filterable {
	fn title(&self) -> &str;

	fn category_id(&self) -> Option<Uuid>;

	fn reminder_at(&self) -> Option<OffsetDateTime>;
}

/// A calendar date together with the offset in which reminders are compared against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderDate {
	pub date: Date,
	pub offset: UtcOffset,
}
impl ReminderDate {
	pub fn contains(&self, instant: OffsetDateTime) -> bool {
		instant.to_offset(self.offset).date() == self.date
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteFilter {
	search: Option<String>,
	category: Option<Uuid>,
	reminder_date: Option<ReminderDate>,
}
impl NoteFilter {
	/// Parses raw query values. Blank values are treated as absent.
	pub fn parse(
		search_query: Option<&str>,
		category: Option<&str>,
		reminder_date: Option<&str>,
	) -> Result<Self, FieldViolation> {
		let search = match non_blank(search_query) {
			Some(query) if query.chars().count() > MAX_SEARCH_QUERY_CHARS => {
				return Err(FieldViolation::new(
					"$.q",
					format!("must be at most {MAX_SEARCH_QUERY_CHARS} characters."),
				));
			},
			Some(query) => Some(query.to_lowercase()),
			None => None,
		};
		let category = match non_blank(category) {
			Some(raw) => Some(
				Uuid::parse_str(raw)
					.map_err(|_| FieldViolation::new("$.category", "must be a category id."))?,
			),
			None => None,
		};
		let reminder_date = match non_blank(reminder_date) {
			Some(raw) => Some(parse_reminder_date(raw)?),
			None => None,
		};

		Ok(Self { search, category, reminder_date })
	}

	pub fn is_empty(&self) -> bool {
		self.search.is_none() && self.category.is_none() && self.reminder_date.is_none()
	}

	pub fn matches<T>(&self, note: &T) -> bool
	where
		T: Filterable,
	{
		if let Some(search) = self.search.as_deref()
			&& !note.title().to_lowercase().contains(search)
		{
			return false;
		}
		if let Some(category) = self.category
			&& note.category_id() != Some(category)
		{
			return false;
		}
		if let Some(reminder_date) = self.reminder_date.as_ref() {
			return note.reminder_at().map(|at| reminder_date.contains(at)).unwrap_or(false);
		}

		true
	}

	pub fn apply<T>(&self, notes: Vec<T>) -> Vec<T>
	where
		T: Filterable,
	{
		if self.is_empty() {
			return notes;
		}

		notes.into_iter().filter(|note| self.matches(note)).collect()
	}
}

/// Accepts `YYYY-MM-DD` (UTC), a browser `datetime-local` value (UTC), or an RFC 3339 instant
/// (compared in its own offset).
pub fn parse_reminder_date(raw: &str) -> Result<ReminderDate, FieldViolation> {
	let raw = raw.trim();

	if let Ok(instant) = OffsetDateTime::parse(raw, &Rfc3339) {
		return Ok(ReminderDate { date: instant.date(), offset: instant.offset() });
	}
	if let Ok(date) = Date::parse(raw, format_description!("[year]-[month]-[day]")) {
		return Ok(ReminderDate { date, offset: UtcOffset::UTC });
	}

	let local_formats = [
		format_description!("[year]-[month]-[day]T[hour]:[minute]"),
		format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
	];

	for format in local_formats {
		if let Ok(local) = PrimitiveDateTime::parse(raw, format) {
			return Ok(ReminderDate { date: local.date(), offset: UtcOffset::UTC });
		}
	}

	Err(FieldViolation::new(
		"$.reminder_date",
		"must be a date (YYYY-MM-DD) or an RFC 3339 timestamp.",
	))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
	value.map(str::trim).filter(|value| !value.is_empty())
}
