pub mod cover;
pub mod library;
pub mod recents;
pub mod search;
pub mod time_serde;
pub mod view;
pub mod year;

use std::{future::Future, pin::Pin, sync::Arc};

use tokio::sync::broadcast;

pub use cover::ResolvedCover;
pub use library::{
	CreateBookRequest, DeleteBookResponse, ListBooksRequest, UpdateBookRequest,
};
pub use recents::{AddRecentRequest, RecentView};
pub use search::{SearchEntryView, SearchResultView};
pub use view::BookView;

use libris_config::Config;
use libris_providers::{CoverImage, CoverSize, EditionSummary, WorkDetail, WorkSummary};
use libris_storage::{
	BookStore, RecencyCappedStore,
	models::{RecentSelection, SearchEntry},
};

pub type ServiceResult<T> = Result<T, ServiceError>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Identity of the caller, resolved upstream and threaded explicitly through
/// every operation. `None` means an unauthenticated caller operating in the
/// legacy global scope.
#[derive(Clone, Debug, Default)]
pub struct AuthContext {
	pub username: Option<String>,
}

impl AuthContext {
	pub fn authenticated(username: impl Into<String>) -> Self {
		Self { username: Some(username.into()) }
	}

	pub fn anonymous() -> Self {
		Self::default()
	}

	fn require_username(&self) -> ServiceResult<&str> {
		self.username.as_deref().ok_or(ServiceError::Unauthenticated)
	}
}

#[derive(Debug)]
pub enum ServiceError {
	Unauthenticated,
	/// Also returned for records owned by someone else, so existence is
	/// never leaked.
	NotFound,
	Validation {
		field: String,
		message: String,
	},
	StoreUnavailable {
		message: String,
	},
}

impl std::fmt::Display for ServiceError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Unauthenticated => write!(f, "Authentication required."),
			Self::NotFound => write!(f, "Book not found."),
			Self::Validation { field, message } => write!(f, "Invalid {field}: {message}."),
			Self::StoreUnavailable { message } => write!(f, "Store unavailable: {message}"),
		}
	}
}

impl std::error::Error for ServiceError {}

impl From<libris_storage::Error> for ServiceError {
	fn from(err: libris_storage::Error) -> Self {
		match err {
			libris_storage::Error::NotFound(_) => Self::NotFound,
			err => Self::StoreUnavailable { message: err.to_string() },
		}
	}
}

impl From<libris_domain::validate::FieldError> for ServiceError {
	fn from(err: libris_domain::validate::FieldError) -> Self {
		Self::Validation { field: err.field.to_string(), message: err.message }
	}
}

/// Seam over the bibliographic metadata provider. The default implementation
/// delegates to the OpenLibrary client in `libris-providers`.
pub trait MetadataProvider
where
	Self: Send + Sync,
{
	fn search_by_term<'a>(
		&'a self,
		cfg: &'a libris_config::Provider,
		term: &'a str,
		limit: u32,
	) -> BoxFuture<'a, libris_providers::Result<Vec<WorkSummary>>>;

	fn work_detail<'a>(
		&'a self,
		cfg: &'a libris_config::Provider,
		work_key: &'a str,
	) -> BoxFuture<'a, libris_providers::Result<WorkDetail>>;

	fn first_edition<'a>(
		&'a self,
		cfg: &'a libris_config::Provider,
		work_key: &'a str,
	) -> BoxFuture<'a, libris_providers::Result<Option<EditionSummary>>>;

	fn fetch_cover<'a>(
		&'a self,
		cfg: &'a libris_config::Provider,
		cover_id: i64,
		size: CoverSize,
	) -> BoxFuture<'a, libris_providers::Result<CoverImage>>;
}

struct DefaultProvider;

impl MetadataProvider for DefaultProvider {
	fn search_by_term<'a>(
		&'a self,
		cfg: &'a libris_config::Provider,
		term: &'a str,
		limit: u32,
	) -> BoxFuture<'a, libris_providers::Result<Vec<WorkSummary>>> {
		Box::pin(libris_providers::openlibrary::search_by_term(cfg, term, limit))
	}

	fn work_detail<'a>(
		&'a self,
		cfg: &'a libris_config::Provider,
		work_key: &'a str,
	) -> BoxFuture<'a, libris_providers::Result<WorkDetail>> {
		Box::pin(libris_providers::openlibrary::work_detail(cfg, work_key))
	}

	fn first_edition<'a>(
		&'a self,
		cfg: &'a libris_config::Provider,
		work_key: &'a str,
	) -> BoxFuture<'a, libris_providers::Result<Option<EditionSummary>>> {
		Box::pin(libris_providers::openlibrary::first_edition(cfg, work_key))
	}

	fn fetch_cover<'a>(
		&'a self,
		cfg: &'a libris_config::Provider,
		cover_id: i64,
		size: CoverSize,
	) -> BoxFuture<'a, libris_providers::Result<CoverImage>> {
		Box::pin(libris_providers::openlibrary::fetch_cover(cfg, cover_id, size))
	}
}

/// The storage seams the service composes. Each trait is implemented once
/// per backing store.
#[derive(Clone)]
pub struct Stores {
	pub books: Arc<dyn BookStore>,
	pub recents: Arc<dyn RecencyCappedStore<Entry = RecentSelection>>,
	pub searches: Arc<dyn RecencyCappedStore<Entry = SearchEntry>>,
}

/// Change notification emitted to external subscribers, e.g. cache
/// invalidation. Fire-and-forget; never awaited by the mutating caller.
#[derive(Clone, Debug, serde::Serialize)]
#[serde(tag = "type")]
pub enum BookEvent {
	Updated { book: BookView },
}

pub struct LibrisService {
	pub cfg: Config,
	pub stores: Stores,
	provider: Arc<dyn MetadataProvider>,
	events: broadcast::Sender<BookEvent>,
}

impl LibrisService {
	pub fn new(cfg: Config, stores: Stores) -> Self {
		Self::with_provider(cfg, stores, Arc::new(DefaultProvider))
	}

	pub fn with_provider(
		cfg: Config,
		stores: Stores,
		provider: Arc<dyn MetadataProvider>,
	) -> Self {
		let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

		Self { cfg, stores, provider, events }
	}

	pub fn subscribe(&self) -> broadcast::Receiver<BookEvent> {
		self.events.subscribe()
	}

	pub(crate) fn provider(&self) -> &dyn MetadataProvider {
		self.provider.as_ref()
	}

	pub(crate) fn emit(&self, event: BookEvent) {
		// A send only fails when nobody subscribes, which is fine.
		let _ = self.events.send(event);
	}
}
