use sqlx::{PgPool, QueryBuilder};
use uuid::Uuid;

use libris_domain::sort::{SortDirection, SortField};

use crate::{
	BookStore, BoxFuture, Result,
	models::{BookFilter, BookPatch, BookRecord},
};

const BOOK_COLUMNS: &str = "\
book_id, username, title, author, publish_year, work_key, cover_id, cover_image, \
cover_mime_type, review, rating, created_at, updated_at";

pub struct PgBookStore {
	pool: PgPool,
}
impl PgBookStore {
	pub fn new(pool: PgPool) -> Self {
		Self { pool }
	}
}
impl BookStore for PgBookStore {
	fn insert(&self, record: BookRecord) -> BoxFuture<'_, Result<BookRecord>> {
		Box::pin(async move {
			let sql = format!(
				"\
INSERT INTO books ({BOOK_COLUMNS})
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
RETURNING {BOOK_COLUMNS}"
			);
			let inserted = sqlx::query_as::<_, BookRecord>(&sql)
				.bind(record.book_id)
				.bind(&record.username)
				.bind(&record.title)
				.bind(&record.author)
				.bind(record.publish_year)
				.bind(&record.work_key)
				.bind(record.cover_id)
				.bind(&record.cover_image)
				.bind(&record.cover_mime_type)
				.bind(&record.review)
				.bind(record.rating)
				.bind(record.created_at)
				.bind(record.updated_at)
				.fetch_one(&self.pool)
				.await?;

			Ok(inserted)
		})
	}

	fn find_by_id(&self, id: Uuid) -> BoxFuture<'_, Result<Option<BookRecord>>> {
		Box::pin(async move {
			let sql = format!("SELECT {BOOK_COLUMNS} FROM books WHERE book_id = $1");
			let record = sqlx::query_as::<_, BookRecord>(&sql)
				.bind(id)
				.fetch_optional(&self.pool)
				.await?;

			Ok(record)
		})
	}

	fn update(&self, id: Uuid, patch: BookPatch) -> BoxFuture<'_, Result<Option<BookRecord>>> {
		Box::pin(async move {
			let mut builder = QueryBuilder::new("UPDATE books SET updated_at = ");

			builder.push_bind(patch.updated_at);

			if let Some(review) = patch.review {
				builder.push(", review = ");
				builder.push_bind(review);
			}
			if let Some(rating) = patch.rating {
				builder.push(", rating = ");
				builder.push_bind(rating);
			}
			if let Some(publish_year) = patch.publish_year {
				builder.push(", publish_year = ");
				builder.push_bind(publish_year);
			}
			if let Some(cover_image) = patch.cover_image {
				builder.push(", cover_image = ");
				builder.push_bind(cover_image);
			}
			if let Some(cover_mime_type) = patch.cover_mime_type {
				builder.push(", cover_mime_type = ");
				builder.push_bind(cover_mime_type);
			}

			builder.push(" WHERE book_id = ");
			builder.push_bind(id);
			builder.push(format!(" RETURNING {BOOK_COLUMNS}"));

			let updated =
				builder.build_query_as::<BookRecord>().fetch_optional(&self.pool).await?;

			Ok(updated)
		})
	}

	fn remove(&self, id: Uuid) -> BoxFuture<'_, Result<bool>> {
		Box::pin(async move {
			let result = sqlx::query("DELETE FROM books WHERE book_id = $1")
				.bind(id)
				.execute(&self.pool)
				.await?;

			Ok(result.rows_affected() > 0)
		})
	}

	fn find<'a>(&'a self, filter: &'a BookFilter) -> BoxFuture<'a, Result<Vec<BookRecord>>> {
		Box::pin(async move {
			let mut builder =
				QueryBuilder::new(format!("SELECT {BOOK_COLUMNS} FROM books WHERE TRUE"));

			if let Some(username) = &filter.username {
				builder.push(" AND username = ");
				builder.push_bind(username);
			}
			if let Some(text) = &filter.text {
				let pattern = like_pattern(text);

				builder.push(" AND (title ILIKE ");
				builder.push_bind(pattern.clone());
				builder.push(" OR author ILIKE ");
				builder.push_bind(pattern);
				builder.push(")");
			}
			if let Some(author) = &filter.author {
				builder.push(" AND author ILIKE ");
				builder.push_bind(like_pattern(author));
			}
			if filter.has_review {
				builder.push(" AND review IS NOT NULL AND review <> ''");
			}

			builder.push(" ORDER BY ");
			builder.push(sort_column(filter.sort.field));
			builder.push(match filter.sort.direction {
				SortDirection::Asc => " ASC",
				SortDirection::Desc => " DESC",
			});

			let records = builder.build_query_as::<BookRecord>().fetch_all(&self.pool).await?;

			Ok(records)
		})
	}

	fn find_by_work_keys<'a>(
		&'a self,
		username: Option<&'a str>,
		work_keys: &'a [String],
	) -> BoxFuture<'a, Result<Vec<BookRecord>>> {
		Box::pin(async move {
			if work_keys.is_empty() {
				return Ok(Vec::new());
			}

			let mut builder = QueryBuilder::new(format!(
				"SELECT {BOOK_COLUMNS} FROM books WHERE work_key = ANY("
			));

			builder.push_bind(work_keys.to_vec());
			builder.push(")");

			if let Some(username) = username {
				builder.push(" AND username = ");
				builder.push_bind(username);
			}

			let records = builder.build_query_as::<BookRecord>().fetch_all(&self.pool).await?;

			Ok(records)
		})
	}
}

/// Allow-listed sort fields map to fixed column names; user input never
/// reaches the ORDER BY clause directly.
fn sort_column(field: SortField) -> &'static str {
	match field {
		SortField::UpdatedAt => "updated_at",
		SortField::CreatedAt => "created_at",
		SortField::Title => "title",
		SortField::Author => "author",
		SortField::Rating => "rating",
		SortField::PublishYear => "publish_year",
	}
}

fn like_pattern(input: &str) -> String {
	let mut escaped = String::with_capacity(input.len() + 2);

	escaped.push('%');

	for ch in input.chars() {
		if matches!(ch, '\\' | '%' | '_') {
			escaped.push('\\');
		}

		escaped.push(ch);
	}

	escaped.push('%');

	escaped
}

#[cfg(test)]
mod tests {
	use super::like_pattern;

	#[test]
	fn like_pattern_escapes_wildcards() {
		assert_eq!(like_pattern("dune"), "%dune%");
		assert_eq!(like_pattern("100%_sure"), "%100\\%\\_sure%");
		assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
	}
}
