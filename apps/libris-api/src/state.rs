use std::sync::Arc;

use libris_service::{LibrisService, Stores};
use libris_storage::{
	books::PgBookStore, db::Db, recents::PgRecentSelections, searches::PgSearchHistory,
};

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<LibrisService>,
}
impl AppState {
	pub async fn new(config: libris_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema().await?;

		let stores = Stores {
			books: Arc::new(PgBookStore::new(db.pool.clone())),
			recents: Arc::new(PgRecentSelections::new(db.pool.clone())),
			searches: Arc::new(PgSearchHistory::new(db.pool.clone())),
		};
		let service = LibrisService::new(config, stores);

		Ok(Self { service: Arc::new(service) })
	}

	pub fn with_service(service: LibrisService) -> Self {
		Self { service: Arc::new(service) }
	}
}
