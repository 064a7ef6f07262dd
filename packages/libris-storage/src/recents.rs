use sqlx::PgPool;
use uuid::Uuid;

use crate::{BoxFuture, Error, RECENCY_CAP, RecencyCappedStore, Result, models::RecentSelection};

const SELECTION_COLUMNS: &str = "\
selection_id, username, work_key, title, author, publish_year, cover_id, cover_image, \
cover_mime_type, created_at";

/// Recent book selections, deduplicated per `(username, work_key)` by the
/// table's unique constraint.
pub struct PgRecentSelections {
	pool: PgPool,
}
impl PgRecentSelections {
	pub fn new(pool: PgPool) -> Self {
		Self { pool }
	}

	async fn trim(&self, scope: &str) -> Result<()> {
		let stale: Vec<Uuid> = sqlx::query_scalar(
			"\
SELECT selection_id
FROM recent_selections
WHERE username = $1
ORDER BY created_at DESC, selection_id
OFFSET $2",
		)
		.bind(scope)
		.bind(RECENCY_CAP)
		.fetch_all(&self.pool)
		.await?;

		if stale.is_empty() {
			return Ok(());
		}

		sqlx::query("DELETE FROM recent_selections WHERE selection_id = ANY($1)")
			.bind(stale)
			.execute(&self.pool)
			.await?;

		Ok(())
	}
}
impl RecencyCappedStore for PgRecentSelections {
	type Entry = RecentSelection;

	fn upsert<'a>(
		&'a self,
		scope: Option<&'a str>,
		_dedup_key: Option<&'a str>,
		entry: RecentSelection,
	) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			let scope = scope.ok_or_else(|| {
				Error::InvalidArgument("Recent selections require a username scope.".to_string())
			})?;

			// The conflict target is the dedup key; a repeat selection replaces
			// the payload and refreshes its recency.
			sqlx::query(
				"\
INSERT INTO recent_selections (
	selection_id,
	username,
	work_key,
	title,
	author,
	publish_year,
	cover_id,
	cover_image,
	cover_mime_type,
	created_at
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
ON CONFLICT (username, work_key) DO UPDATE
SET
	title = EXCLUDED.title,
	author = EXCLUDED.author,
	publish_year = EXCLUDED.publish_year,
	cover_id = EXCLUDED.cover_id,
	cover_image = EXCLUDED.cover_image,
	cover_mime_type = EXCLUDED.cover_mime_type,
	created_at = EXCLUDED.created_at",
			)
			.bind(entry.selection_id)
			.bind(scope)
			.bind(&entry.work_key)
			.bind(&entry.title)
			.bind(&entry.author)
			.bind(entry.publish_year)
			.bind(entry.cover_id)
			.bind(&entry.cover_image)
			.bind(&entry.cover_mime_type)
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
	) -> BoxFuture<'a, Result<Vec<RecentSelection>>> {
		Box::pin(async move {
			let scope = scope.ok_or_else(|| {
				Error::InvalidArgument("Recent selections require a username scope.".to_string())
			})?;
			let sql = format!(
				"\
SELECT {SELECTION_COLUMNS}
FROM recent_selections
WHERE username = $1
ORDER BY created_at DESC, selection_id
LIMIT $2"
			);
			let entries = sqlx::query_as::<_, RecentSelection>(&sql)
				.bind(scope)
				.bind(limit)
				.fetch_all(&self.pool)
				.await?;

			Ok(entries)
		})
	}
}
