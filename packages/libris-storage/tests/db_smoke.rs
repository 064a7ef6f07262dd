use time::OffsetDateTime;
use uuid::Uuid;

use libris_config::Postgres;
use libris_storage::{
	BookStore, RECENCY_CAP, RecencyCappedStore,
	books::PgBookStore,
	db::Db,
	models::{BookPatch, BookRecord, RecentSelection, SearchEntry},
	recents::PgRecentSelections,
	searches::PgSearchHistory,
};
use libris_testkit::TestDatabase;

fn book(username: Option<&str>, title: &str) -> BookRecord {
	let now = OffsetDateTime::now_utc();

	BookRecord {
		book_id: Uuid::new_v4(),
		username: username.map(str::to_string),
		title: title.to_string(),
		author: None,
		publish_year: None,
		work_key: None,
		cover_id: None,
		cover_image: None,
		cover_mime_type: None,
		review: None,
		rating: None,
		created_at: now,
		updated_at: now,
	}
}

fn selection(work_key: &str, title: &str, created_at: OffsetDateTime) -> RecentSelection {
	RecentSelection {
		selection_id: Uuid::new_v4(),
		username: "alice".to_string(),
		work_key: work_key.to_string(),
		title: title.to_string(),
		author: None,
		publish_year: None,
		cover_id: None,
		cover_image: None,
		cover_mime_type: None,
		created_at,
	}
}

async fn connect(test_db: &TestDatabase) -> Db {
	let cfg = Postgres { dsn: test_db.dsn().to_string(), pool_max_conns: 2 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");

	db
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set LIBRIS_PG_DSN to run."]
async fn db_connects_and_bootstraps() {
	let Some(base_dsn) = libris_testkit::env_dsn() else {
		eprintln!("Skipping db_connects_and_bootstraps; set LIBRIS_PG_DSN to run this test.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = connect(&test_db).await;

	for table in ["books", "recent_selections", "search_history"] {
		let count: i64 = sqlx::query_scalar(
			"SELECT count(*) FROM information_schema.tables WHERE table_name = $1",
		)
		.bind(table)
		.fetch_one(&db.pool)
		.await
		.expect("Failed to query schema tables.");

		assert_eq!(count, 1, "Expected table {table} to exist.");
	}

	// Bootstrapping twice must be a no-op.
	db.ensure_schema().await.expect("Failed to re-ensure schema.");

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set LIBRIS_PG_DSN to run."]
async fn book_crud_round_trips() {
	let Some(base_dsn) = libris_testkit::env_dsn() else {
		eprintln!("Skipping book_crud_round_trips; set LIBRIS_PG_DSN to run this test.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = connect(&test_db).await;
	let store = PgBookStore::new(db.pool.clone());
	let mut record = book(Some("alice"), "Dune");

	record.work_key = Some("/works/OL1W".to_string());

	let inserted = store.insert(record.clone()).await.expect("Insert failed.");

	assert_eq!(inserted.book_id, record.book_id);

	let fetched = store
		.find_by_id(record.book_id)
		.await
		.expect("Find failed.")
		.expect("Expected the inserted record.");

	assert_eq!(fetched.title, "Dune");

	let mut patch = BookPatch::new(OffsetDateTime::now_utc());

	patch.review = Some("Sand.".to_string());
	patch.rating = Some(5);

	let updated = store
		.update(record.book_id, patch)
		.await
		.expect("Update failed.")
		.expect("Expected the updated record.");

	assert_eq!(updated.review.as_deref(), Some("Sand."));
	assert_eq!(updated.rating, Some(5));
	assert!(updated.updated_at > fetched.updated_at);

	let matches = store
		.find_by_work_keys(Some("alice"), &["/works/OL1W".to_string()])
		.await
		.expect("Work key lookup failed.");

	assert_eq!(matches.len(), 1);

	let foreign = store
		.find_by_work_keys(Some("bob"), &["/works/OL1W".to_string()])
		.await
		.expect("Work key lookup failed.");

	assert!(foreign.is_empty());
	assert!(store.remove(record.book_id).await.expect("Remove failed."));
	assert!(!store.remove(record.book_id).await.expect("Repeat remove failed."));

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set LIBRIS_PG_DSN to run."]
async fn recent_selections_cap_and_dedup() {
	let Some(base_dsn) = libris_testkit::env_dsn() else {
		eprintln!("Skipping recent_selections_cap_and_dedup; set LIBRIS_PG_DSN to run this test.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = connect(&test_db).await;
	let store = PgRecentSelections::new(db.pool.clone());
	let base = OffsetDateTime::now_utc();

	for index in 1..=7 {
		let key = format!("/works/OL{index}W");
		let stamped = base + time::Duration::seconds(index);

		store
			.upsert(Some("alice"), Some(&key), selection(&key, "Book", stamped))
			.await
			.expect("Upsert failed.");
	}

	let entries = store.list(Some("alice"), RECENCY_CAP).await.expect("List failed.");

	assert_eq!(entries.len(), RECENCY_CAP as usize);
	assert_eq!(entries[0].work_key, "/works/OL7W");

	// A repeated key replaces the payload without growing the list.
	store
		.upsert(
			Some("alice"),
			Some("/works/OL7W"),
			selection("/works/OL7W", "Renamed", base + time::Duration::seconds(8)),
		)
		.await
		.expect("Upsert failed.");

	let entries = store.list(Some("alice"), RECENCY_CAP).await.expect("List failed.");

	assert_eq!(entries.len(), RECENCY_CAP as usize);
	assert_eq!(entries[0].title, "Renamed");

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set LIBRIS_PG_DSN to run."]
async fn search_history_scopes_include_the_global_null_scope() {
	let Some(base_dsn) = libris_testkit::env_dsn() else {
		eprintln!(
			"Skipping search_history_scopes_include_the_global_null_scope; set LIBRIS_PG_DSN to run this test."
		);

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = connect(&test_db).await;
	let store = PgSearchHistory::new(db.pool.clone());
	let entry = |term: &str| SearchEntry {
		search_id: Uuid::new_v4(),
		username: None,
		term: term.to_string(),
		created_at: OffsetDateTime::now_utc(),
	};

	store.upsert(Some("alice"), None, entry("dune")).await.expect("Upsert failed.");
	store.upsert(None, None, entry("legacy")).await.expect("Upsert failed.");

	let scoped = store.list(Some("alice"), RECENCY_CAP).await.expect("List failed.");

	assert_eq!(scoped.len(), 1);
	assert_eq!(scoped[0].term, "dune");

	let global = store.list(None, RECENCY_CAP).await.expect("List failed.");

	assert_eq!(global.len(), 1);
	assert_eq!(global[0].term, "legacy");

	// Repeated terms are not deduplicated, only capped.
	for _ in 0..6 {
		store.upsert(Some("alice"), None, entry("dune")).await.expect("Upsert failed.");
	}

	let scoped = store.list(Some("alice"), 10).await.expect("List failed.");

	assert_eq!(scoped.len(), RECENCY_CAP as usize);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
