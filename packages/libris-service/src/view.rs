//! Explicit serialization per entity: each view enumerates exactly the
//! fields that are externally visible.

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use time::OffsetDateTime;
use uuid::Uuid;

use libris_domain::cover::DEFAULT_COVER_MIME;
use libris_providers::{CoverSize, openlibrary};
use libris_storage::models::BookRecord;

/// Path under which stored cover bytes are served.
pub const FRONT_COVER_PATH: &str = "/api/books/front-cover";

/// Display shape of a saved book.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookView {
	pub id: Uuid,
	pub title: String,
	pub author: Option<String>,
	pub publish_year: Option<i32>,
	pub work_key: Option<String>,
	pub cover_id: Option<i64>,
	pub cover_image_base64: Option<String>,
	pub cover_mime_type: String,
	pub cover_url: Option<String>,
	pub review: Option<String>,
	pub rating: Option<i32>,
	#[serde(with = "crate::time_serde")]
	pub created_at: OffsetDateTime,
	#[serde(with = "crate::time_serde")]
	pub updated_at: OffsetDateTime,
}

impl BookView {
	pub fn from_record(cfg: &libris_config::Provider, record: &BookRecord) -> Self {
		Self {
			id: record.book_id,
			title: record.title.clone(),
			author: record.author.clone(),
			publish_year: record.publish_year,
			work_key: record.work_key.clone(),
			cover_id: record.cover_id,
			cover_image_base64: encode_cover(record.cover_image.as_deref()),
			cover_mime_type: record
				.cover_mime_type
				.clone()
				.unwrap_or_else(|| DEFAULT_COVER_MIME.to_string()),
			cover_url: derive_cover_url(cfg, record),
			review: record.review.clone(),
			rating: record.rating,
			created_at: record.created_at,
			updated_at: record.updated_at,
		}
	}
}

/// Stored bytes win over the provider URL so a locally cached cover keeps
/// working when the provider does not.
pub(crate) fn derive_cover_url(
	cfg: &libris_config::Provider,
	record: &BookRecord,
) -> Option<String> {
	if record.cover_image.is_some() {
		return Some(local_cover_path(record.book_id));
	}

	record.cover_id.map(|cover_id| openlibrary::cover_url(cfg, cover_id, CoverSize::Medium))
}

pub(crate) fn local_cover_path(id: Uuid) -> String {
	format!("{FRONT_COVER_PATH}/{id}")
}

pub(crate) fn encode_cover(bytes: Option<&[u8]>) -> Option<String> {
	bytes.map(|bytes| BASE64.encode(bytes))
}

pub(crate) fn decode_cover(encoded: &str) -> Result<Vec<u8>, base64::DecodeError> {
	BASE64.decode(encoded)
}
