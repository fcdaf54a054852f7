use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use quill_config::{
	Config, Notes, Notifier, NotifierKind, Postgres, Reminders, Security, Service, Storage,
	Webhook,
};
use quill_domain::view::ViewMode;
use quill_service::{
	CreateCategoryRequest, CreateGroupRequest, Error, ListRequest, NoteRequest, QuillService,
};
use quill_storage::db::Db;
use quill_testkit::TestDatabase;

fn test_config(dsn: String) -> Config {
	Config {
		service: Service {
			http_bind: "127.0.0.1:0".to_string(),
			admin_bind: "127.0.0.1:0".to_string(),
			log_level: "info".to_string(),
		},
		storage: Storage {
			postgres: Postgres { dsn, pool_max_conns: 4, retry_attempts: 1, retry_backoff_ms: 0 },
		},
		notes: Notes::default(),
		reminders: Reminders::default(),
		notifier: Notifier {
			kind: NotifierKind::Webhook,
			telegram: None,
			webhook: Some(Webhook { url: "http://127.0.0.1:9/hook".to_string(), auth_token: None }),
		},
		security: Security::default(),
	}
}

async fn test_service(test_db: &TestDatabase) -> QuillService {
	let cfg = test_config(test_db.dsn().to_string());
	let db = Db::connect(&cfg.storage.postgres).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");

	QuillService::new(cfg, db)
}

fn note(title: &str, body: &str) -> NoteRequest {
	NoteRequest { title: title.to_string(), body: body.to_string(), ..Default::default() }
}

fn titles(notes: &[quill_service::NoteView]) -> Vec<&str> {
	notes.iter().map(|n| n.title.as_str()).collect()
}

macro_rules! require_db {
	($name:literal) => {
		match quill_testkit::env_dsn() {
			Some(dsn) => dsn,
			None => {
				eprintln!(concat!("Skipping ", $name, "; set QUILL_PG_DSN to run this test."));

				return;
			},
		}
	};
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set QUILL_PG_DSN to run."]
async fn create_then_get_round_trips() {
	let base_dsn = require_db!("create_then_get_round_trips");
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let service = test_service(&test_db).await;
	let reminder = OffsetDateTime::now_utc() + Duration::days(1);
	let created = service
		.create_note(
			"alice",
			NoteRequest { reminder_at: Some(reminder), ..note("  Dentist  ", "Tuesday") },
		)
		.await
		.expect("Failed to create note.");

	assert_eq!(created.title, "Dentist");
	assert_eq!(created.owner_id.as_deref(), Some("alice"));
	assert_eq!(created.created_at, created.updated_at);

	let fetched = service.get_note("alice", created.note_id).await.expect("Failed to get note.");

	assert_eq!(fetched.title, created.title);
	assert_eq!(fetched.body, created.body);
	assert_eq!(fetched.reminder_at, created.reminder_at);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set QUILL_PG_DSN to run."]
async fn written_timestamps_match_a_later_read() {
	let base_dsn = require_db!("written_timestamps_match_a_later_read");
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let service = test_service(&test_db).await;
	let reminder = OffsetDateTime::now_utc()
		.replace_nanosecond(123_456_789)
		.expect("Nanosecond in range.")
		+ Duration::days(1);
	let created = service
		.create_note("alice", NoteRequest { reminder_at: Some(reminder), ..note("Call", "Mum") })
		.await
		.expect("Failed to create note.");
	let fetched = service.get_note("alice", created.note_id).await.expect("Failed to get note.");

	assert_eq!(created, fetched);
	assert_eq!(created.reminder_at.map(|at| at.nanosecond()), Some(123_456_000));

	let updated = service
		.update_note("alice", created.note_id, NoteRequest {
			reminder_at: Some(reminder + Duration::hours(1)),
			..note("Call", "Dad")
		})
		.await
		.expect("Failed to update note.");
	let fetched = service.get_note("alice", created.note_id).await.expect("Failed to get note.");

	assert_eq!(updated, fetched);

	let category = service
		.create_category(CreateCategoryRequest { title: "Family".to_string() })
		.await
		.expect("Failed to create category.");
	let listed = service.list_categories().await.expect("Failed to list categories.");

	assert_eq!(listed, vec![category]);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set QUILL_PG_DSN to run."]
async fn sharing_follows_live_membership() {
	let base_dsn = require_db!("sharing_follows_live_membership");
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let service = test_service(&test_db).await;
	let group = service
		.create_group(CreateGroupRequest {
			name: "family".to_string(),
			members: vec!["alice".to_string()],
		})
		.await
		.expect("Failed to create group.");
	let shared = service
		.create_note("alice", NoteRequest { group_id: Some(group.group_id), ..note("Trip", "Pack") })
		.await
		.expect("Failed to create shared note.");
	let private =
		service.create_note("alice", note("Diary", "Secret")).await.expect("Failed to create note.");
	let err = service.get_note("bob", shared.note_id).await.expect_err("bob is not a member yet");

	assert!(matches!(err, Error::AccessDenied { .. }), "Unexpected error: {err:?}");

	service.add_member(group.group_id, "bob").await.expect("Failed to add member.");

	let visible = service.get_note("bob", shared.note_id).await.expect("member added later reads");

	assert_eq!(visible.note_id, shared.note_id);

	let err = service.get_note("bob", private.note_id).await.expect_err("private stays private");

	assert!(matches!(err, Error::AccessDenied { .. }));

	let err = service
		.update_note(
			"bob",
			shared.note_id,
			NoteRequest {
				title: "Hijacked".to_string(),
				body: "x".to_string(),
				group_id: Some(group.group_id),
				..Default::default()
			},
		)
		.await
		.expect_err("members never write");

	assert!(matches!(err, Error::AccessDenied { .. }));

	let err = service.delete_note("bob", shared.note_id).await.expect_err("members never delete");

	assert!(matches!(err, Error::AccessDenied { .. }));

	let listed = service
		.list_notes("bob", ListRequest { view: ViewMode::Group, ..Default::default() })
		.await
		.expect("Failed to list notes.");

	assert_eq!(titles(&listed.notes), vec!["Trip"]);

	service.remove_member(group.group_id, "bob").await.expect("Failed to remove member.");

	let err = service.get_note("bob", shared.note_id).await.expect_err("former member loses access");

	assert!(matches!(err, Error::AccessDenied { .. }));

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set QUILL_PG_DSN to run."]
async fn sharing_requires_membership_and_existing_references() {
	let base_dsn = require_db!("sharing_requires_membership_and_existing_references");
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let service = test_service(&test_db).await;
	let group = service
		.create_group(CreateGroupRequest { name: "work".to_string(), members: Vec::new() })
		.await
		.expect("Failed to create group.");
	let err = service
		.create_note("alice", NoteRequest { group_id: Some(group.group_id), ..note("a", "b") })
		.await
		.expect_err("non-members cannot share");

	assert!(matches!(err, Error::InvalidGroup { .. }), "Unexpected error: {err:?}");

	let err = service
		.create_note("alice", NoteRequest { group_id: Some(Uuid::new_v4()), ..note("a", "b") })
		.await
		.expect_err("unknown group");

	assert!(matches!(err, Error::NotFound { .. }));

	let err = service
		.create_note(
			"alice",
			NoteRequest { category_id: Some(Uuid::new_v4()), ..note("a", "b") },
		)
		.await
		.expect_err("unknown category");

	assert!(matches!(err, Error::NotFound { .. }));

	let err = service.create_note("alice", note("   ", "")).await.expect_err("blank fields");
	let Error::InvalidInput { fields, .. } = err else {
		panic!("Expected InvalidInput, got {err:?}.");
	};

	assert_eq!(fields, vec!["$.title".to_string(), "$.body".to_string()]);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set QUILL_PG_DSN to run."]
async fn unchanged_update_only_advances_updated_at() {
	let base_dsn = require_db!("unchanged_update_only_advances_updated_at");
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let service = test_service(&test_db).await;
	let created =
		service.create_note("alice", note("Plan", "Steps")).await.expect("Failed to create note.");
	let same = NoteRequest {
		title: created.title.clone(),
		body: created.body.clone(),
		..Default::default()
	};
	let first = service
		.update_note("alice", created.note_id, same.clone())
		.await
		.expect("Failed to update note.");
	let second =
		service.update_note("alice", created.note_id, same).await.expect("Failed to update note.");

	for updated in [&first, &second] {
		assert_eq!(updated.title, created.title);
		assert_eq!(updated.body, created.body);
		assert_eq!(updated.created_at, created.created_at);
		assert_eq!(updated.owner_id, created.owner_id);
	}

	assert!(first.updated_at >= created.updated_at);
	assert!(second.updated_at >= first.updated_at);

	let err = service
		.update_note("alice", Uuid::new_v4(), NoteRequest {
			title: "x".to_string(),
			body: "y".to_string(),
			..Default::default()
		})
		.await
		.expect_err("unknown note");

	assert!(matches!(err, Error::NotFound { .. }));

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set QUILL_PG_DSN to run."]
async fn delete_returns_title_then_note_is_gone() {
	let base_dsn = require_db!("delete_returns_title_then_note_is_gone");
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let service = test_service(&test_db).await;
	let created =
		service.create_note("alice", note("Old list", "eggs")).await.expect("Failed to create.");
	let deleted = service.delete_note("alice", created.note_id).await.expect("Failed to delete.");

	assert_eq!(deleted.note_id, created.note_id);
	assert_eq!(deleted.title, "Old list");

	let err = service.get_note("alice", created.note_id).await.expect_err("deleted note");

	assert!(matches!(err, Error::NotFound { .. }));

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set QUILL_PG_DSN to run."]
async fn listing_is_newest_first_and_filters_compose() {
	let base_dsn = require_db!("listing_is_newest_first_and_filters_compose");
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let service = test_service(&test_db).await;
	let shopping = service
		.create_category(CreateCategoryRequest { title: "Shopping".to_string() })
		.await
		.expect("Failed to create category.");
	let tomorrow = OffsetDateTime::now_utc() + Duration::days(1);

	for (title, category, reminder) in [
		("Buy milk", Some(shopping.category_id), Some(tomorrow)),
		("Meeting notes", None, Some(tomorrow)),
		("Buy shoes", Some(shopping.category_id), None),
		("Meeting agenda", Some(shopping.category_id), Some(tomorrow)),
	] {
		service
			.create_note(
				"alice",
				NoteRequest { category_id: category, reminder_at: reminder, ..note(title, "-") },
			)
			.await
			.expect("Failed to create note.");
	}

	let all = service.list_notes("alice", ListRequest::default()).await.expect("Failed to list.");

	assert_eq!(titles(&all.notes), vec!["Meeting agenda", "Buy shoes", "Meeting notes", "Buy milk"]);

	let filtered = service
		.list_notes("alice", ListRequest {
			q: Some("meeting".to_string()),
			category: Some(shopping.category_id.to_string()),
			reminder_date: Some(tomorrow.date().to_string()),
			..Default::default()
		})
		.await
		.expect("Failed to list.");

	assert_eq!(titles(&filtered.notes), vec!["Meeting agenda"]);

	let by_category = service
		.list_notes("alice", ListRequest {
			category: Some(shopping.category_id.to_string()),
			..Default::default()
		})
		.await
		.expect("Failed to list.");

	assert_eq!(titles(&by_category.notes), vec!["Meeting agenda", "Buy shoes", "Buy milk"]);

	let err = service
		.list_notes("alice", ListRequest {
			reminder_date: Some("tomorrow".to_string()),
			..Default::default()
		})
		.await
		.expect_err("malformed date");

	assert!(matches!(err, Error::InvalidInput { .. }));

	service
		.delete_category(shopping.category_id)
		.await
		.expect("Failed to delete category.");

	let after = service.list_notes("alice", ListRequest::default()).await.expect("Failed to list.");

	assert_eq!(after.notes.len(), 4);
	assert!(after.notes.iter().all(|n| n.category_id.is_none()));

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set QUILL_PG_DSN to run."]
async fn removing_a_user_keeps_their_notes() {
	let base_dsn = require_db!("removing_a_user_keeps_their_notes");
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let service = test_service(&test_db).await;
	let group = service
		.create_group(CreateGroupRequest {
			name: "team".to_string(),
			members: vec!["alice".to_string(), "bob".to_string()],
		})
		.await
		.expect("Failed to create group.");
	let shared = service
		.create_note("alice", NoteRequest { group_id: Some(group.group_id), ..note("Roadmap", "Q3") })
		.await
		.expect("Failed to create note.");

	service.remove_user("alice").await.expect("Failed to remove user.");

	let orphan = service.get_note("bob", shared.note_id).await.expect("still shared with bob");

	assert_eq!(orphan.owner_id, None);

	let members = service.list_members(group.group_id).await.expect("Failed to list members.");

	assert_eq!(members.iter().map(|m| m.user_id.as_str()).collect::<Vec<_>>(), vec!["bob"]);

	let err = service.remove_user("alice").await.expect_err("already removed");

	assert!(matches!(err, Error::NotFound { .. }));

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
