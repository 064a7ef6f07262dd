use sqlx::PgPool;
use uuid::Uuid;

use crate::{BoxFuture, RECENCY_CAP, RecencyCappedStore, Result, models::SearchEntry};

/// Search-term history. No dedup key: every logged term is a new entry.
/// A `NULL` username is the global legacy scope.
pub struct PgSearchHistory {
	pool: PgPool,
}
impl PgSearchHistory {
	pub fn new(pool: PgPool) -> Self {
		Self { pool }
	}

	async fn trim(&self, scope: Option<&str>) -> Result<()> {
		let stale: Vec<Uuid> = sqlx::query_scalar(
			"\
SELECT search_id
FROM search_history
WHERE username IS NOT DISTINCT FROM $1
ORDER BY created_at DESC, search_id
OFFSET $2",
		)
		.bind(scope)
		.bind(RECENCY_CAP)
		.fetch_all(&self.pool)
		.await?;

		if stale.is_empty() {
			return Ok(());
		}

		sqlx::query("DELETE FROM search_history WHERE search_id = ANY($1)")
			.bind(stale)
			.execute(&self.pool)
			.await?;

		Ok(())
	}
}
impl RecencyCappedStore for PgSearchHistory {
	type Entry = SearchEntry;

	fn upsert<'a>(
		&'a self,
		scope: Option<&'a str>,
		_dedup_key: Option<&'a str>,
		entry: SearchEntry,
	) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			sqlx::query(
				"\
INSERT INTO search_history (search_id, username, term, created_at)
VALUES ($1, $2, $3, $4)",
			)
			.bind(entry.search_id)
			.bind(scope)
			.bind(&entry.term)
			.bind(entry.created_at)
			.execute(&self.pool)
			.await?;

			self.trim(scope).await
		})
	}

	fn list<'a>(
		&'a self,
		scope: Option<&'a str>,
		limit: i64,
	) -> BoxFuture<'a, Result<Vec<SearchEntry>>> {
		Box::pin(async move {
			let entries = sqlx::query_as::<_, SearchEntry>(
				"\
SELECT search_id, username, term, created_at
FROM search_history
WHERE username IS NOT DISTINCT FROM $1
ORDER BY created_at DESC, search_id
LIMIT $2",
			)
			.bind(scope)
			.bind(limit)
			.fetch_all(&self.pool)
			.await?;

			Ok(entries)
		})
	}
}
