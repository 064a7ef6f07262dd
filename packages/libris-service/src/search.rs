use std::collections::HashMap;

use time::OffsetDateTime;
use uuid::Uuid;

use libris_domain::validate::require_non_empty;
use libris_storage::{
	BookStore as _, RECENCY_CAP, RecencyCappedStore as _, models::SearchEntry,
};

use crate::{AuthContext, LibrisService, ServiceResult, view};

/// One aggregated search row: a provider document merged with the caller's
/// saved state. Provider order is preserved.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultView {
	pub id: Option<String>,
	pub title: String,
	pub author: Option<String>,
	pub publish_year: Option<i32>,
	pub cover_url: Option<String>,
	pub saved: bool,
	pub saved_id: Option<Uuid>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchEntryView {
	pub id: Uuid,
	pub term: String,
	#[serde(with = "crate::time_serde")]
	pub created_at: OffsetDateTime,
}

impl LibrisService {
	/// Term search: records the term best-effort, then aggregates.
	pub async fn search(
		&self,
		ctx: &AuthContext,
		term: &str,
	) -> ServiceResult<Vec<SearchResultView>> {
		require_non_empty("q", term)?;

		self.record_search_term(ctx, term).await;

		self.build_search_results(ctx, term).await
	}

	/// Replays the caller's most recent search without logging it again.
	pub async fn home(&self, ctx: &AuthContext) -> ServiceResult<Vec<SearchResultView>> {
		let term = match self.stores.searches.list(ctx.username.as_deref(), 1).await {
			Ok(entries) => entries.into_iter().next().map(|entry| entry.term),
			Err(err) => {
				tracing::warn!(error = %err, "Failed to read search history for home.");

				None
			},
		};
		let Some(term) = term else {
			return Ok(Vec::new());
		};

		self.build_search_results(ctx, &term).await
	}

	pub async fn last_searches(&self, ctx: &AuthContext) -> ServiceResult<Vec<SearchEntryView>> {
		let entries = self.stores.searches.list(ctx.username.as_deref(), RECENCY_CAP).await?;

		Ok(entries
			.into_iter()
			.map(|entry| SearchEntryView {
				id: entry.search_id,
				term: entry.term,
				created_at: entry.created_at,
			})
			.collect())
	}

	/// History writes are a side path: a down store degrades search to
	/// not-logged instead of failing it.
	async fn record_search_term(&self, ctx: &AuthContext, term: &str) {
		let entry = SearchEntry {
			search_id: Uuid::new_v4(),
			username: ctx.username.clone(),
			term: term.to_string(),
			created_at: OffsetDateTime::now_utc(),
		};

		if let Err(err) =
			self.stores.searches.upsert(ctx.username.as_deref(), None, entry).await
		{
			tracing::warn!(error = %err, "Failed to record search term.");
		}
	}

	async fn build_search_results(
		&self,
		ctx: &AuthContext,
		term: &str,
	) -> ServiceResult<Vec<SearchResultView>> {
		let limit = self.cfg.provider.search_limit;
		let docs = match self.provider().search_by_term(&self.cfg.provider, term, limit).await {
			Ok(docs) => docs,
			Err(err) => {
				tracing::warn!(error = %err, term, "Provider search failed.");

				return Ok(Vec::new());
			},
		};
		let work_keys: Vec<String> =
			docs.iter().filter_map(|doc| doc.work_key.clone()).collect();
		let saved = if work_keys.is_empty() {
			Vec::new()
		} else {
			self.stores.books.find_by_work_keys(ctx.username.as_deref(), &work_keys).await?
		};
		let saved_by_key: HashMap<&str, _> = saved
			.iter()
			.filter_map(|record| record.work_key.as_deref().map(|key| (key, record)))
			.collect();
		let results = docs
			.into_iter()
			.map(|doc| {
				let saved_record =
					doc.work_key.as_deref().and_then(|key| saved_by_key.get(key).copied());
				let cover_url = match saved_record {
					Some(record) if record.cover_image.is_some() => {
						Some(view::local_cover_path(record.book_id))
					},
					_ => doc.cover_id.map(|cover_id| {
						libris_providers::openlibrary::cover_url(
							&self.cfg.provider,
							cover_id,
							libris_providers::CoverSize::Medium,
						)
					}),
				};

				SearchResultView {
					id: doc.work_key,
					title: doc.title,
					author: doc.author,
					publish_year: doc.publish_year,
					cover_url,
					saved: saved_record.is_some(),
					saved_id: saved_record.map(|record| record.book_id),
				}
			})
			.collect();

		Ok(results)
	}
}
