//! Publish-year fallback chain. Every tier swallows failure; the chain
//! yields a year or nothing and never fails the caller's primary operation.

use time::OffsetDateTime;

use libris_domain::year::extract_year;
use libris_storage::{
	BookStore as _,
	models::{BookPatch, BookRecord},
};

use crate::LibrisService;

impl LibrisService {
	/// Fills a missing publish year on a stored record, persisting the
	/// resolved value best-effort. Returns the record unchanged when no tier
	/// yields a year.
	pub(crate) async fn ensure_publish_year(&self, record: BookRecord) -> BookRecord {
		if record.publish_year.is_some() {
			return record;
		}

		let Some(year) = self.resolve_publish_year(&record).await else {
			return record;
		};
		let mut patch = BookPatch::new(OffsetDateTime::now_utc());

		patch.publish_year = Some(year);

		match self.stores.books.update(record.book_id, patch).await {
			Ok(Some(updated)) => updated,
			Ok(None) => enriched(record, year),
			Err(err) => {
				tracing::warn!(
					error = %err,
					book_id = %record.book_id,
					"Failed to persist resolved publish year.",
				);

				enriched(record, year)
			},
		}
	}

	async fn resolve_publish_year(&self, record: &BookRecord) -> Option<i32> {
		if let Some(work_key) = record.work_key.as_deref() {
			return self.resolve_year_from_work(work_key).await;
		}

		self.resolve_year_from_search(&record.title, record.author.as_deref()).await
	}

	/// Tiers 1-3: the work's direct first-publish year, its free-text
	/// first-publish date, then the first edition's publish date.
	pub(crate) async fn resolve_year_from_work(&self, work_key: &str) -> Option<i32> {
		match self.provider().work_detail(&self.cfg.provider, work_key).await {
			Ok(detail) => {
				if let Some(year) = detail.first_publish_year {
					return Some(year);
				}
				if let Some(year) = detail.first_publish_date.as_deref().and_then(extract_year) {
					return Some(year);
				}
			},
			Err(err) => {
				tracing::warn!(error = %err, work_key, "Work detail lookup failed.");
			},
		}

		match self.provider().first_edition(&self.cfg.provider, work_key).await {
			Ok(Some(edition)) => edition.publish_date.as_deref().and_then(extract_year),
			Ok(None) => None,
			Err(err) => {
				tracing::warn!(error = %err, work_key, "First edition lookup failed.");

				None
			},
		}
	}

	/// Tier 4, reached only when the record carries no work key: infer the
	/// year from the first result of a title/author search.
	async fn resolve_year_from_search(&self, title: &str, author: Option<&str>) -> Option<i32> {
		let query = match author {
			Some(author) => format!("{title} author:{author}"),
			None => title.to_string(),
		};

		match self.provider().search_by_term(&self.cfg.provider, &query, 1).await {
			Ok(results) => results.first().and_then(|summary| summary.publish_year),
			Err(err) => {
				tracing::warn!(error = %err, "Year inference search failed.");

				None
			},
		}
	}
}

fn enriched(mut record: BookRecord, year: i32) -> BookRecord {
	record.publish_year = Some(year);

	record
}
