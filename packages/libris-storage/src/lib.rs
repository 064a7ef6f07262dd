pub mod books;
pub mod db;
pub mod models;
pub mod recents;
pub mod schema;
pub mod searches;

mod error;

pub use error::Error;

use std::{future::Future, pin::Pin};

use uuid::Uuid;

use crate::models::{BookFilter, BookPatch, BookRecord};

pub type Result<T, E = Error> = std::result::Result<T, E>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Maximum entries kept per scope in a recency-capped list.
pub const RECENCY_CAP: i64 = 5;

/// Narrow persistence contract for the library catalog. Implemented once per
/// backing store; callers never depend on a concrete store.
pub trait BookStore
where
	Self: Send + Sync,
{
	fn insert(&self, record: BookRecord) -> BoxFuture<'_, Result<BookRecord>>;

	fn find_by_id(&self, id: Uuid) -> BoxFuture<'_, Result<Option<BookRecord>>>;

	/// Applies a set-style patch and returns the updated record, or `None`
	/// when the id does not exist.
	fn update(&self, id: Uuid, patch: BookPatch) -> BoxFuture<'_, Result<Option<BookRecord>>>;

	/// Returns whether a record was removed.
	fn remove(&self, id: Uuid) -> BoxFuture<'_, Result<bool>>;

	fn find<'a>(&'a self, filter: &'a BookFilter) -> BoxFuture<'a, Result<Vec<BookRecord>>>;

	/// Records matching any of `work_keys`, scoped to `username` when given.
	fn find_by_work_keys<'a>(
		&'a self,
		username: Option<&'a str>,
		work_keys: &'a [String],
	) -> BoxFuture<'a, Result<Vec<BookRecord>>>;
}

/// A per-scope list bounded to [`RECENCY_CAP`] entries ordered by recency.
///
/// `upsert` with a dedup key replaces the existing `(scope, key)` entry and
/// refreshes its position; without one every insertion is new. After each
/// write the scope is trimmed back to the cap, oldest first. The trim is
/// read-then-conditionally-delete: concurrent writers may briefly overshoot
/// the cap, which is an accepted race for a personal low-contention list.
pub trait RecencyCappedStore
where
	Self: Send + Sync,
{
	type Entry: Send;

	fn upsert<'a>(
		&'a self,
		scope: Option<&'a str>,
		dedup_key: Option<&'a str>,
		entry: Self::Entry,
	) -> BoxFuture<'a, Result<()>>;

	/// Entries for the scope, most recent first, at most `limit`.
	fn list<'a>(
		&'a self,
		scope: Option<&'a str>,
		limit: i64,
	) -> BoxFuture<'a, Result<Vec<Self::Entry>>>;
}
