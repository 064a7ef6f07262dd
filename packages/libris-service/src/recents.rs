use time::OffsetDateTime;
use uuid::Uuid;

use libris_domain::cover::DEFAULT_COVER_MIME;
use libris_domain::validate::require_non_empty;
use libris_storage::{RECENCY_CAP, RecencyCappedStore as _, models::RecentSelection};

use crate::{AuthContext, LibrisService, ServiceError, ServiceResult, view};

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddRecentRequest {
	pub work_key: String,
	pub title: String,
	pub author: Option<String>,
	pub publish_year: Option<i32>,
	pub cover_id: Option<i64>,
	pub cover_image_base64: Option<String>,
	pub cover_mime_type: Option<String>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentView {
	pub id: Uuid,
	pub work_key: String,
	pub title: String,
	pub author: Option<String>,
	pub publish_year: Option<i32>,
	pub cover_id: Option<i64>,
	pub cover_image_base64: Option<String>,
	pub cover_mime_type: String,
	#[serde(with = "crate::time_serde")]
	pub created_at: OffsetDateTime,
}

impl LibrisService {
	/// Records a selected work as recent. A repeat selection of the same work
	/// replaces the stored payload and moves it to the front. Unlike search
	/// history, this is a direct user action, so a down store surfaces.
	pub async fn add_recent(&self, ctx: &AuthContext, req: AddRecentRequest) -> ServiceResult<()> {
		let username = ctx.require_username()?;

		require_non_empty("workKey", &req.work_key)?;
		require_non_empty("title", &req.title)?;

		let cover_image = match req.cover_image_base64.as_deref() {
			Some(encoded) => Some(view::decode_cover(encoded).map_err(|_| {
				ServiceError::Validation {
					field: "coverImageBase64".to_string(),
					message: "must be valid base64".to_string(),
				}
			})?),
			None => None,
		};
		let entry = RecentSelection {
			selection_id: Uuid::new_v4(),
			username: username.to_string(),
			work_key: req.work_key.clone(),
			title: req.title,
			author: req.author,
			publish_year: req.publish_year,
			cover_id: req.cover_id,
			cover_image,
			cover_mime_type: req.cover_mime_type,
			created_at: OffsetDateTime::now_utc(),
		};

		self.stores.recents.upsert(Some(username), Some(&req.work_key), entry).await?;

		Ok(())
	}

	pub async fn list_recents(&self, ctx: &AuthContext) -> ServiceResult<Vec<RecentView>> {
		let username = ctx.require_username()?;
		let entries = self.stores.recents.list(Some(username), RECENCY_CAP).await?;

		Ok(entries
			.into_iter()
			.map(|entry| RecentView {
				id: entry.selection_id,
				work_key: entry.work_key,
				title: entry.title,
				author: entry.author,
				publish_year: entry.publish_year,
				cover_id: entry.cover_id,
				cover_image_base64: view::encode_cover(entry.cover_image.as_deref()),
				cover_mime_type: entry
					.cover_mime_type
					.unwrap_or_else(|| DEFAULT_COVER_MIME.to_string()),
				created_at: entry.created_at,
			})
			.collect())
	}
}
