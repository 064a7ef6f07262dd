use time::OffsetDateTime;
use uuid::Uuid;

/// A saved library book. `book_id` is immutable once persisted and
/// `updated_at` increases with every mutation. A `NULL` username marks a
/// legacy record visible to every caller.
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct BookRecord {
	pub book_id: Uuid,
	pub username: Option<String>,
	pub title: String,
	pub author: Option<String>,
	pub publish_year: Option<i32>,
	pub work_key: Option<String>,
	pub cover_id: Option<i64>,
	pub cover_image: Option<Vec<u8>>,
	pub cover_mime_type: Option<String>,
	pub review: Option<String>,
	pub rating: Option<i32>,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}

/// One of a user's five most recently selected works. Unique per
/// `(username, work_key)`.
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct RecentSelection {
	pub selection_id: Uuid,
	pub username: String,
	pub work_key: String,
	pub title: String,
	pub author: Option<String>,
	pub publish_year: Option<i32>,
	pub cover_id: Option<i64>,
	pub cover_image: Option<Vec<u8>>,
	pub cover_mime_type: Option<String>,
	pub created_at: OffsetDateTime,
}

/// A logged search term. Legacy rows carry no username and live in the
/// global scope.
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct SearchEntry {
	pub search_id: Uuid,
	pub username: Option<String>,
	pub term: String,
	pub created_at: OffsetDateTime,
}

/// Set-style patch applied to a book. Fields left `None` are untouched;
/// `updated_at` is always stamped.
#[derive(Clone, Debug)]
pub struct BookPatch {
	pub review: Option<String>,
	pub rating: Option<i32>,
	pub publish_year: Option<i32>,
	pub cover_image: Option<Vec<u8>>,
	pub cover_mime_type: Option<String>,
	pub updated_at: OffsetDateTime,
}

impl BookPatch {
	pub fn new(updated_at: OffsetDateTime) -> Self {
		Self {
			review: None,
			rating: None,
			publish_year: None,
			cover_image: None,
			cover_mime_type: None,
			updated_at,
		}
	}

}

/// Library listing filter. `username: None` keeps the legacy unscoped view.
#[derive(Clone, Debug, Default)]
pub struct BookFilter {
	pub username: Option<String>,
	pub text: Option<String>,
	pub author: Option<String>,
	pub has_review: bool,
	pub sort: libris_domain::sort::SortSpec,
}
