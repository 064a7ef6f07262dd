//! Ownership-scoped CRUD over the library, composing the year and cover
//! resolvers. Ownership and existence are checked before any provider call.

use futures::future::join_all;
use time::OffsetDateTime;
use uuid::Uuid;

use libris_domain::{
	sort::parse_sort,
	validate::{require_non_empty, validate_rating, validate_review},
};
use libris_storage::{
	BookStore as _,
	models::{BookFilter, BookPatch, BookRecord},
};

use crate::{AuthContext, BookEvent, BookView, LibrisService, ServiceError, ServiceResult, view};

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookRequest {
	pub title: String,
	pub author: Option<String>,
	pub publish_year: Option<i32>,
	pub work_key: Option<String>,
	pub cover_id: Option<i64>,
	pub cover_image_base64: Option<String>,
	pub cover_mime_type: Option<String>,
	pub review: Option<String>,
	pub rating: Option<i32>,
}

/// Only the review and the rating are mutable after creation.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookRequest {
	pub review: Option<String>,
	pub rating: Option<i32>,
}

#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListBooksRequest {
	pub q: Option<String>,
	pub author: Option<String>,
	pub has_review: Option<bool>,
	pub sort: Option<String>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct DeleteBookResponse {
	pub ok: bool,
}

impl LibrisService {
	pub async fn create_book(
		&self,
		ctx: &AuthContext,
		req: CreateBookRequest,
	) -> ServiceResult<BookView> {
		let username = ctx.require_username()?;

		require_non_empty("title", &req.title)?;

		if let Some(review) = req.review.as_deref() {
			validate_review(review)?;
		}
		if let Some(rating) = req.rating {
			validate_rating(rating)?;
		}

		let supplied_cover = match req.cover_image_base64.as_deref() {
			Some(encoded) => Some(view::decode_cover(encoded).map_err(|_| {
				ServiceError::Validation {
					field: "coverImageBase64".to_string(),
					message: "must be valid base64".to_string(),
				}
			})?),
			None => None,
		};

		// The two enrichment fetches touch disjoint fields and run
		// concurrently; both results land in the single insert below.
		let cover_fut = async {
			match (supplied_cover.is_none(), req.cover_id) {
				(true, Some(cover_id)) => self.fetch_cover_eager(cover_id).await,
				_ => None,
			}
		};
		let year_fut = async {
			match (req.publish_year.is_none(), req.work_key.as_deref()) {
				(true, Some(work_key)) => self.resolve_year_from_work(work_key).await,
				_ => None,
			}
		};
		let (fetched_cover, resolved_year) = tokio::join!(cover_fut, year_fut);
		let (cover_image, cover_mime_type) = match (supplied_cover, fetched_cover) {
			(Some(bytes), _) => (Some(bytes), req.cover_mime_type),
			(None, Some(image)) => (Some(image.bytes), Some(image.mime_type)),
			(None, None) => (None, req.cover_mime_type),
		};
		let now = OffsetDateTime::now_utc();
		let record = BookRecord {
			book_id: Uuid::new_v4(),
			username: Some(username.to_string()),
			title: req.title,
			author: req.author,
			publish_year: req.publish_year.or(resolved_year),
			work_key: req.work_key,
			cover_id: req.cover_id,
			cover_image,
			cover_mime_type,
			review: req.review,
			rating: req.rating,
			created_at: now,
			updated_at: now,
		};
		let inserted = self.stores.books.insert(record).await?;

		Ok(BookView::from_record(&self.cfg.provider, &inserted))
	}

	pub async fn get_book(&self, ctx: &AuthContext, id: Uuid) -> ServiceResult<BookView> {
		let record = self.find_owned(ctx, id).await?;
		let record = self.ensure_publish_year(record).await;

		Ok(BookView::from_record(&self.cfg.provider, &record))
	}

	pub async fn update_book(
		&self,
		ctx: &AuthContext,
		id: Uuid,
		req: UpdateBookRequest,
	) -> ServiceResult<BookView> {
		if let Some(review) = req.review.as_deref() {
			validate_review(review)?;
		}
		if let Some(rating) = req.rating {
			validate_rating(rating)?;
		}

		self.find_owned(ctx, id).await?;

		let mut patch = BookPatch::new(OffsetDateTime::now_utc());

		patch.review = req.review;
		patch.rating = req.rating;

		let updated =
			self.stores.books.update(id, patch).await?.ok_or(ServiceError::NotFound)?;
		let book = BookView::from_record(&self.cfg.provider, &updated);

		self.emit(BookEvent::Updated { book: book.clone() });

		Ok(book)
	}

	pub async fn delete_book(
		&self,
		ctx: &AuthContext,
		id: Uuid,
	) -> ServiceResult<DeleteBookResponse> {
		self.find_owned(ctx, id).await?;

		if !self.stores.books.remove(id).await? {
			return Err(ServiceError::NotFound);
		}

		Ok(DeleteBookResponse { ok: true })
	}

	pub async fn list_books(
		&self,
		ctx: &AuthContext,
		req: ListBooksRequest,
	) -> ServiceResult<Vec<BookView>> {
		let filter = BookFilter {
			username: ctx.username.clone(),
			text: req.q.filter(|q| !q.is_empty()),
			author: req.author.filter(|author| !author.is_empty()),
			has_review: req.has_review.unwrap_or(false),
			sort: parse_sort(req.sort.as_deref()),
		};
		let records = self.stores.books.find(&filter).await?;
		let enriched =
			join_all(records.into_iter().map(|record| self.ensure_publish_year(record))).await;

		Ok(enriched
			.iter()
			.map(|record| BookView::from_record(&self.cfg.provider, record))
			.collect())
	}

	/// Resolves a record the caller is allowed to see. A record owned by
	/// someone else is indistinguishable from a missing one.
	async fn find_owned(&self, ctx: &AuthContext, id: Uuid) -> ServiceResult<BookRecord> {
		let record = self.stores.books.find_by_id(id).await?.ok_or(ServiceError::NotFound)?;

		if let (Some(owner), Some(caller)) =
			(record.username.as_deref(), ctx.username.as_deref())
			&& owner != caller
		{
			return Err(ServiceError::NotFound);
		}

		Ok(record)
	}
}
