use std::collections::HashSet;

use time::{Duration, OffsetDateTime, macros::datetime};
use uuid::Uuid;

use quill_domain::{
	access::{self, NoteAccess, Permission, Requester},
	filter::{Filterable, NoteFilter},
	reminder::ReminderState,
	validate,
	view::ViewMode,
};

#[derive(Debug, Clone, PartialEq)]
struct Item {
	title: String,
	category_id: Option<Uuid>,
	reminder_at: Option<OffsetDateTime>,
	created_at: OffsetDateTime,
}
impl Item {
	fn new(title: &str, created_at: OffsetDateTime) -> Self {
		Self { title: title.to_string(), category_id: None, reminder_at: None, created_at }
	}
}
impl Filterable for Item {
	fn title(&self) -> &str {
		&self.title
	}

	fn category_id(&self) -> Option<Uuid> {
		self.category_id
	}

	fn reminder_at(&self) -> Option<OffsetDateTime> {
		self.reminder_at
	}
}

fn limits() -> quill_config::Notes {
	quill_config::Notes { max_title_chars: 10, max_body_chars: 20 }
}

#[test]
fn owner_can_read_and_write_private_note() {
	let groups = HashSet::new();
	let owner = Requester { user_id: "alice", groups: &groups };
	let note = NoteAccess { owner_id: Some("alice"), group_id: None };

	assert!(access::can_read(&owner, &note));
	assert!(access::can_write(&owner, &note));
}

#[test]
fn stranger_cannot_read_private_note() {
	let groups = HashSet::from([Uuid::new_v4()]);
	let stranger = Requester { user_id: "bob", groups: &groups };
	let note = NoteAccess { owner_id: Some("alice"), group_id: None };

	assert!(!access::can_read(&stranger, &note));
	assert!(!access::can_write(&stranger, &note));
}

#[test]
fn group_member_reads_but_never_writes() {
	let group_id = Uuid::new_v4();
	let groups = HashSet::from([group_id]);
	let member = Requester { user_id: "bob", groups: &groups };
	let note = NoteAccess { owner_id: Some("alice"), group_id: Some(group_id) };

	assert!(access::allows(Permission::Read, &member, &note));
	assert!(!access::allows(Permission::Write, &member, &note));
}

#[test]
fn read_access_follows_current_membership() {
	let group_id = Uuid::new_v4();
	let note = NoteAccess { owner_id: Some("alice"), group_id: Some(group_id) };
	let before = HashSet::new();
	let after = HashSet::from([group_id]);

	assert!(!access::can_read(&Requester { user_id: "carol", groups: &before }, &note));
	// Joining after the note was shared grants access on the next check.
	assert!(access::can_read(&Requester { user_id: "carol", groups: &after }, &note));
	// Leaving revokes it again.
	assert!(!access::can_read(&Requester { user_id: "carol", groups: &before }, &note));
}

#[test]
fn owner_keeps_access_after_leaving_the_group() {
	let group_id = Uuid::new_v4();
	let groups = HashSet::new();
	let owner = Requester { user_id: "alice", groups: &groups };
	let note = NoteAccess { owner_id: Some("alice"), group_id: Some(group_id) };

	assert!(access::can_read(&owner, &note));
	assert!(access::can_write(&owner, &note));
}

#[test]
fn view_modes_partition_visible_notes() {
	let shared = Uuid::new_v4();
	let groups = HashSet::from([shared]);
	let alice = Requester { user_id: "alice", groups: &groups };
	let private = NoteAccess { owner_id: Some("alice"), group_id: None };
	let own_shared = NoteAccess { owner_id: Some("alice"), group_id: Some(shared) };
	let peer_shared = NoteAccess { owner_id: Some("bob"), group_id: Some(shared) };
	let foreign = NoteAccess { owner_id: Some("bob"), group_id: Some(Uuid::new_v4()) };

	assert!(ViewMode::Personal.includes(&alice, &private));
	assert!(!ViewMode::Personal.includes(&alice, &own_shared));
	assert!(ViewMode::Group.includes(&alice, &own_shared));
	assert!(ViewMode::Group.includes(&alice, &peer_shared));
	assert!(!ViewMode::Group.includes(&alice, &private));
	assert!(!ViewMode::Group.includes(&alice, &foreign));
}

#[test]
fn view_mode_toggles_and_parses() {
	assert_eq!(ViewMode::default(), ViewMode::Personal);
	assert_eq!(ViewMode::Personal.toggled(), ViewMode::Group);
	assert_eq!(ViewMode::Group.toggled(), ViewMode::Personal);
	assert_eq!(" Group ".parse::<ViewMode>(), Ok(ViewMode::Group));
	assert!("shared".parse::<ViewMode>().is_err());
	assert_eq!(serde_json::to_value(ViewMode::Group).expect("serialize"), "group");
}

#[test]
fn filters_compose_conjunctively() {
	let c1 = Uuid::new_v4();
	let c2 = Uuid::new_v4();
	let base = datetime!(2026-01-01 00:00 UTC);
	let shopping =
		Item { category_id: Some(c1), ..Item::new("Shopping", base + Duration::minutes(1)) };
	let meeting = Item { category_id: Some(c2), ..Item::new("Meeting", base) };
	let notes = vec![shopping.clone(), meeting.clone()];

	let by_search = NoteFilter::parse(Some("shop"), None, None).expect("parse failed");

	assert_eq!(by_search.apply(notes.clone()), vec![shopping.clone()]);

	let by_category = NoteFilter::parse(None, Some(&c2.to_string()), None).expect("parse failed");

	assert_eq!(by_category.apply(notes.clone()), vec![meeting]);

	let both =
		NoteFilter::parse(Some("shop"), Some(&c1.to_string()), None).expect("parse failed");

	assert_eq!(both.apply(notes.clone()), vec![shopping]);

	let contradictory =
		NoteFilter::parse(Some("shop"), Some(&c2.to_string()), None).expect("parse failed");

	assert!(contradictory.apply(notes).is_empty());
}

#[test]
fn search_ignores_case_and_body() {
	let filter = NoteFilter::parse(Some("  MEET "), None, None).expect("parse failed");
	let note = Item::new("Weekly meeting", datetime!(2026-01-01 00:00 UTC));
	let other = Item::new("Groceries", datetime!(2026-01-01 00:00 UTC));

	assert!(filter.matches(&note));
	assert!(!filter.matches(&other));
}

#[test]
fn category_filter_never_matches_uncategorized() {
	let category = Uuid::new_v4().to_string();
	let filter = NoteFilter::parse(None, Some(&category), None).expect("parse failed");

	assert!(!filter.matches(&Item::new("Anything", datetime!(2026-01-01 00:00 UTC))));
}

#[test]
fn reminder_date_matches_whole_calendar_day() {
	let filter = NoteFilter::parse(None, None, Some("2026-05-04")).expect("parse failed");
	let created = datetime!(2026-01-01 00:00 UTC);
	let reminding = |title: &str, at: OffsetDateTime| Item {
		reminder_at: Some(at),
		..Item::new(title, created)
	};
	let morning = reminding("a", datetime!(2026-05-04 00:00 UTC));
	let night = reminding("b", datetime!(2026-05-04 23:59:59 UTC));
	let next_day = reminding("c", datetime!(2026-05-05 00:00 UTC));
	let none = Item::new("d", created);

	assert!(filter.matches(&morning));
	assert!(filter.matches(&night));
	assert!(!filter.matches(&next_day));
	assert!(!filter.matches(&none));
}

#[test]
fn filtering_preserves_newest_first_order() {
	let t1 = datetime!(2026-01-01 00:00 UTC);
	let notes = vec![
		Item::new("Note: plan C", t1 + Duration::hours(2)),
		Item::new("Note: memo B", t1 + Duration::hours(1)),
		Item::new("Note: plan A", t1),
	];

	assert_eq!(NoteFilter::default().apply(notes.clone()), notes);

	let no_match = NoteFilter::parse(Some("absent"), None, None).expect("parse failed");

	assert!(no_match.apply(notes.clone()).is_empty());

	let all_match = NoteFilter::parse(Some("note"), None, None).expect("parse failed");

	assert_eq!(all_match.apply(notes.clone()), notes);

	let plans = NoteFilter::parse(Some("plan"), None, None).expect("parse failed");

	assert_eq!(plans.apply(notes.clone()), vec![notes[0].clone(), notes[2].clone()]);
}

#[test]
fn blank_filters_are_no_ops() {
	let filter = NoteFilter::parse(Some("   "), Some(""), Some(" ")).expect("parse failed");

	assert!(filter.is_empty());
}

#[test]
fn malformed_filters_name_the_field() {
	let err = NoteFilter::parse(None, Some("not-a-uuid"), None).expect_err("expected failure");

	assert_eq!(err.field, "$.category");

	let err = NoteFilter::parse(None, None, Some("04/05/2026")).expect_err("expected failure");

	assert_eq!(err.field, "$.reminder_date");

	let long = "x".repeat(101);
	let err = NoteFilter::parse(Some(&long), None, None).expect_err("expected failure");

	assert_eq!(err.field, "$.q");
}

#[test]
fn note_text_reports_every_violation() {
	let violations = validate::note_text("  ", "\n", &limits()).expect_err("expected failure");
	let fields: Vec<_> = violations.iter().map(|v| v.field).collect();

	assert_eq!(fields, vec!["$.title", "$.body"]);

	let violations = validate::note_text("Exactly 11!", &"b".repeat(21), &limits())
		.expect_err("expected failure");

	assert_eq!(violations.len(), 2);
}

#[test]
fn note_text_trims_title_only() {
	let text = validate::note_text("  Plan  ", " body ", &limits()).expect("valid input");

	assert_eq!(text.title, "Plan");
	assert_eq!(text.body, " body ");
}

#[test]
fn reminder_state_machine() {
	let now = datetime!(2026-06-01 12:00 UTC);

	assert_eq!(ReminderState::of(None, now), None);
	assert_eq!(
		ReminderState::of(Some(now + Duration::seconds(1)), now),
		Some(ReminderState::Scheduled)
	);
	assert_eq!(ReminderState::of(Some(now), now), Some(ReminderState::Due));
	assert_eq!(ReminderState::of(Some(now - Duration::seconds(1)), now), Some(ReminderState::Due));

	let delivered = ReminderState::Due.after_attempt(true);
	let failed = ReminderState::Due.after_attempt(false);

	assert_eq!(delivered, ReminderState::Delivered);
	assert!(delivered.clears_reminder());
	assert_eq!(failed, ReminderState::Failed);
	assert!(!failed.clears_reminder());
	assert_eq!(ReminderState::Scheduled.after_attempt(true), ReminderState::Scheduled);
}
