//! Cover fallback chain. Total by construction: stored bytes, then a
//! provider fetch persisted for later reads, then a fixed placeholder.

use time::OffsetDateTime;
use uuid::Uuid;

use libris_domain::cover::{DEFAULT_COVER_MIME, PLACEHOLDER_MIME, PLACEHOLDER_PNG};
use libris_providers::{CoverImage, CoverSize};
use libris_storage::{
	BookStore as _,
	models::{BookPatch, BookRecord},
};

use crate::{LibrisService, ServiceError, ServiceResult};

/// Displayable cover bytes; always non-empty.
#[derive(Clone, Debug)]
pub struct ResolvedCover {
	pub bytes: Vec<u8>,
	pub mime_type: String,
}

impl ResolvedCover {
	pub fn placeholder() -> Self {
		Self { bytes: PLACEHOLDER_PNG.to_vec(), mime_type: PLACEHOLDER_MIME.to_string() }
	}
}

impl LibrisService {
	/// Serves a record's cover. Fails only when the record itself does not
	/// exist; cover resolution never does.
	pub async fn front_cover(&self, id: Uuid) -> ServiceResult<ResolvedCover> {
		let record = self.stores.books.find_by_id(id).await?.ok_or(ServiceError::NotFound)?;

		Ok(self.resolve_cover(record).await)
	}

	pub(crate) async fn resolve_cover(&self, record: BookRecord) -> ResolvedCover {
		if let Some(bytes) = record.cover_image.as_ref().filter(|bytes| !bytes.is_empty()) {
			return ResolvedCover {
				bytes: bytes.clone(),
				mime_type: record
					.cover_mime_type
					.clone()
					.unwrap_or_else(|| DEFAULT_COVER_MIME.to_string()),
			};
		}
		if let Some(cover_id) = record.cover_id {
			match self.provider().fetch_cover(&self.cfg.provider, cover_id, CoverSize::Large).await
			{
				Ok(image) => {
					let mut patch = BookPatch::new(OffsetDateTime::now_utc());

					patch.cover_image = Some(image.bytes.clone());
					patch.cover_mime_type = Some(image.mime_type.clone());

					// Later reads then hit the stored-bytes tier directly.
					if let Err(err) = self.stores.books.update(record.book_id, patch).await {
						tracing::warn!(
							error = %err,
							book_id = %record.book_id,
							"Failed to persist fetched cover.",
						);
					}

					return ResolvedCover { bytes: image.bytes, mime_type: image.mime_type };
				},
				Err(err) => {
					tracing::warn!(error = %err, cover_id, "Cover fetch failed.");
				},
			}
		}

		ResolvedCover::placeholder()
	}

	/// Ingestion-time fetch; the caller merges the bytes into its single
	/// insert instead of persisting here.
	pub(crate) async fn fetch_cover_eager(&self, cover_id: i64) -> Option<CoverImage> {
		match self.provider().fetch_cover(&self.cfg.provider, cover_id, CoverSize::Large).await {
			Ok(image) => Some(image),
			Err(err) => {
				tracing::warn!(error = %err, cover_id, "Eager cover fetch failed.");

				None
			},
		}
	}
}
