//! Hermetic in-memory implementations of the storage traits, mirroring the
//! Postgres query semantics closely enough for service-level tests.

use std::{
	cmp::Ordering,
	marker::PhantomData,
	sync::{
		Mutex,
		atomic::{AtomicU64, Ordering as AtomicOrdering},
	},
};

use uuid::Uuid;

use libris_domain::sort::{SortDirection, SortField};
use libris_storage::{
	BookStore, BoxFuture, RECENCY_CAP, RecencyCappedStore,
	models::{BookFilter, BookPatch, BookRecord},
};

type StoreResult<T> = libris_storage::Result<T>;

#[derive(Default)]
pub struct MemoryBookStore {
	records: Mutex<Vec<BookRecord>>,
}
impl MemoryBookStore {
	pub fn new() -> Self {
		Self::default()
	}

	fn lock(&self) -> std::sync::MutexGuard<'_, Vec<BookRecord>> {
		self.records.lock().unwrap_or_else(|err| err.into_inner())
	}
}
impl BookStore for MemoryBookStore {
	fn insert(&self, record: BookRecord) -> BoxFuture<'_, StoreResult<BookRecord>> {
		Box::pin(async move {
			self.lock().push(record.clone());

			Ok(record)
		})
	}

	fn find_by_id(&self, id: Uuid) -> BoxFuture<'_, StoreResult<Option<BookRecord>>> {
		Box::pin(async move {
			Ok(self.lock().iter().find(|record| record.book_id == id).cloned())
		})
	}

	fn update(
		&self,
		id: Uuid,
		patch: BookPatch,
	) -> BoxFuture<'_, StoreResult<Option<BookRecord>>> {
		Box::pin(async move {
			let mut records = self.lock();
			let Some(record) = records.iter_mut().find(|record| record.book_id == id) else {
				return Ok(None);
			};

			if let Some(review) = patch.review {
				record.review = Some(review);
			}
			if let Some(rating) = patch.rating {
				record.rating = Some(rating);
			}
			if let Some(publish_year) = patch.publish_year {
				record.publish_year = Some(publish_year);
			}
			if let Some(cover_image) = patch.cover_image {
				record.cover_image = Some(cover_image);
			}
			if let Some(cover_mime_type) = patch.cover_mime_type {
				record.cover_mime_type = Some(cover_mime_type);
			}

			record.updated_at = patch.updated_at;

			Ok(Some(record.clone()))
		})
	}

	fn remove(&self, id: Uuid) -> BoxFuture<'_, StoreResult<bool>> {
		Box::pin(async move {
			let mut records = self.lock();
			let before = records.len();

			records.retain(|record| record.book_id != id);

			Ok(records.len() < before)
		})
	}

	fn find<'a>(&'a self, filter: &'a BookFilter) -> BoxFuture<'a, StoreResult<Vec<BookRecord>>> {
		Box::pin(async move {
			let mut records: Vec<BookRecord> = self
				.lock()
				.iter()
				.filter(|record| matches_filter(record, filter))
				.cloned()
				.collect();

			records.sort_by(|a, b| {
				let ascending = cmp_by_field(a, b, filter.sort.field);

				match filter.sort.direction {
					SortDirection::Asc => ascending,
					SortDirection::Desc => ascending.reverse(),
				}
			});

			Ok(records)
		})
	}

	fn find_by_work_keys<'a>(
		&'a self,
		username: Option<&'a str>,
		work_keys: &'a [String],
	) -> BoxFuture<'a, StoreResult<Vec<BookRecord>>> {
		Box::pin(async move {
			let records = self
				.lock()
				.iter()
				.filter(|record| {
					record
						.work_key
						.as_deref()
						.is_some_and(|key| work_keys.iter().any(|wanted| wanted == key))
				})
				.filter(|record| {
					username.is_none_or(|username| record.username.as_deref() == Some(username))
				})
				.cloned()
				.collect();

			Ok(records)
		})
	}
}

fn matches_filter(record: &BookRecord, filter: &BookFilter) -> bool {
	if let Some(username) = &filter.username
		&& record.username.as_deref() != Some(username.as_str())
	{
		return false;
	}
	if let Some(text) = &filter.text {
		let needle = text.to_lowercase();
		let in_title = record.title.to_lowercase().contains(&needle);
		let in_author = record
			.author
			.as_deref()
			.is_some_and(|author| author.to_lowercase().contains(&needle));

		if !in_title && !in_author {
			return false;
		}
	}
	if let Some(author) = &filter.author {
		let needle = author.to_lowercase();

		if !record
			.author
			.as_deref()
			.is_some_and(|author| author.to_lowercase().contains(&needle))
		{
			return false;
		}
	}
	if filter.has_review && !record.review.as_deref().is_some_and(|review| !review.is_empty()) {
		return false;
	}

	true
}

// Ascending with `None` greatest; reversing then matches Postgres'
// ASC NULLS LAST / DESC NULLS FIRST defaults.
fn cmp_by_field(a: &BookRecord, b: &BookRecord, field: SortField) -> Ordering {
	match field {
		SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
		SortField::CreatedAt => a.created_at.cmp(&b.created_at),
		SortField::Title => a.title.cmp(&b.title),
		SortField::Author => cmp_nulls_last(&a.author, &b.author),
		SortField::Rating => cmp_nulls_last(&a.rating, &b.rating),
		SortField::PublishYear => cmp_nulls_last(&a.publish_year, &b.publish_year),
	}
}

fn cmp_nulls_last<T>(a: &Option<T>, b: &Option<T>) -> Ordering
where
	T: Ord,
{
	match (a, b) {
		(Some(a), Some(b)) => a.cmp(b),
		(Some(_), None) => Ordering::Less,
		(None, Some(_)) => Ordering::Greater,
		(None, None) => Ordering::Equal,
	}
}

struct Stored<E> {
	scope: Option<String>,
	dedup_key: Option<String>,
	seq: u64,
	entry: E,
}

/// Generic in-memory recency-capped list; a logical clock stands in for the
/// creation timestamp so same-instant writes keep a stable order.
pub struct MemoryRecency<E> {
	entries: Mutex<Vec<Stored<E>>>,
	seq: AtomicU64,
}
impl<E> MemoryRecency<E> {
	pub fn new() -> Self {
		Self { entries: Mutex::new(Vec::new()), seq: AtomicU64::new(0) }
	}

	fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Stored<E>>> {
		self.entries.lock().unwrap_or_else(|err| err.into_inner())
	}
}
impl<E> Default for MemoryRecency<E> {
	fn default() -> Self {
		Self::new()
	}
}
impl<E> RecencyCappedStore for MemoryRecency<E>
where
	E: Clone + Send + Sync + 'static,
{
	type Entry = E;

	fn upsert<'a>(
		&'a self,
		scope: Option<&'a str>,
		dedup_key: Option<&'a str>,
		entry: E,
	) -> BoxFuture<'a, StoreResult<()>> {
		Box::pin(async move {
			let seq = self.seq.fetch_add(1, AtomicOrdering::SeqCst);
			let mut entries = self.lock();
			let existing = dedup_key.and_then(|key| {
				entries.iter().position(|stored| {
					stored.scope.as_deref() == scope && stored.dedup_key.as_deref() == Some(key)
				})
			});

			if let Some(index) = existing {
				let stored = &mut entries[index];

				stored.entry = entry;
				stored.seq = seq;
			} else {
				entries.push(Stored {
					scope: scope.map(str::to_string),
					dedup_key: dedup_key.map(str::to_string),
					seq,
					entry,
				});
			}

			let mut scoped: Vec<(u64, usize)> = entries
				.iter()
				.enumerate()
				.filter(|(_, stored)| stored.scope.as_deref() == scope)
				.map(|(index, stored)| (stored.seq, index))
				.collect();

			scoped.sort_by(|a, b| b.0.cmp(&a.0));

			let mut stale: Vec<usize> =
				scoped.into_iter().skip(RECENCY_CAP as usize).map(|(_, index)| index).collect();

			stale.sort_unstable_by(|a, b| b.cmp(a));

			for index in stale {
				entries.remove(index);
			}

			Ok(())
		})
	}

	fn list<'a>(
		&'a self,
		scope: Option<&'a str>,
		limit: i64,
	) -> BoxFuture<'a, StoreResult<Vec<E>>> {
		Box::pin(async move {
			let entries = self.lock();
			let mut scoped: Vec<(u64, E)> = entries
				.iter()
				.filter(|stored| stored.scope.as_deref() == scope)
				.map(|stored| (stored.seq, stored.entry.clone()))
				.collect();

			scoped.sort_by(|a, b| b.0.cmp(&a.0));

			Ok(scoped.into_iter().take(limit.max(0) as usize).map(|(_, entry)| entry).collect())
		})
	}
}

/// Always fails with a closed-pool error, for exercising the
/// store-unavailable paths.
pub struct UnavailableRecency<E> {
	_marker: PhantomData<fn() -> E>,
}
impl<E> UnavailableRecency<E> {
	pub fn new() -> Self {
		Self { _marker: PhantomData }
	}
}
impl<E> Default for UnavailableRecency<E> {
	fn default() -> Self {
		Self::new()
	}
}
impl<E> RecencyCappedStore for UnavailableRecency<E>
where
	E: Send + Sync + 'static,
{
	type Entry = E;

	fn upsert<'a>(
		&'a self,
		_scope: Option<&'a str>,
		_dedup_key: Option<&'a str>,
		_entry: E,
	) -> BoxFuture<'a, StoreResult<()>> {
		Box::pin(async move { Err(libris_storage::Error::Sqlx(sqlx::Error::PoolClosed)) })
	}

	fn list<'a>(
		&'a self,
		_scope: Option<&'a str>,
		_limit: i64,
	) -> BoxFuture<'a, StoreResult<Vec<E>>> {
		Box::pin(async move { Err(libris_storage::Error::Sqlx(sqlx::Error::PoolClosed)) })
	}
}
