use std::sync::{Arc, Mutex};

use axum::{
	body::{self, Body},
	http::{Request, StatusCode, header},
};
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use serde_json::Value;
use tower::util::ServiceExt;

use libris_api::{routes, state::AppState};
use libris_config::{Config, Postgres, Provider, Service, Storage};
use libris_providers::{CoverImage, CoverSize, EditionSummary, WorkDetail, WorkSummary};
use libris_service::{BoxFuture, LibrisService, MetadataProvider, Stores};
use libris_storage::{
	BookStore, RecencyCappedStore,
	models::{RecentSelection, SearchEntry},
};
use libris_testkit::{MemoryBookStore, MemoryRecency};

#[derive(Default)]
struct StubProvider {
	search_results: Mutex<Vec<WorkSummary>>,
}
impl MetadataProvider for StubProvider {
	fn search_by_term<'a>(
		&'a self,
		_cfg: &'a libris_config::Provider,
		_term: &'a str,
		_limit: u32,
	) -> BoxFuture<'a, libris_providers::Result<Vec<WorkSummary>>> {
		let results = self.search_results.lock().unwrap().clone();

		Box::pin(async move { Ok(results) })
	}

	fn work_detail<'a>(
		&'a self,
		_cfg: &'a libris_config::Provider,
		_work_key: &'a str,
	) -> BoxFuture<'a, libris_providers::Result<WorkDetail>> {
		Box::pin(async move { Ok(WorkDetail::default()) })
	}

	fn first_edition<'a>(
		&'a self,
		_cfg: &'a libris_config::Provider,
		_work_key: &'a str,
	) -> BoxFuture<'a, libris_providers::Result<Option<EditionSummary>>> {
		Box::pin(async move { Ok(None) })
	}

	fn fetch_cover<'a>(
		&'a self,
		_cfg: &'a libris_config::Provider,
		_cover_id: i64,
		_size: CoverSize,
	) -> BoxFuture<'a, libris_providers::Result<CoverImage>> {
		Box::pin(async move {
			Err(libris_providers::Error::InvalidResponse {
				message: "No covers in tests.".to_string(),
			})
		})
	}
}

fn test_config() -> Config {
	Config {
		service: Service {
			http_bind: "127.0.0.1:0".to_string(),
			log_level: "info".to_string(),
		},
		storage: Storage {
			postgres: Postgres { dsn: "postgres://unused".to_string(), pool_max_conns: 1 },
		},
		provider: Provider {
			api_base: "https://openlibrary.test".to_string(),
			covers_base: "https://covers.test".to_string(),
			timeout_ms: 1_000,
			search_limit: 10,
		},
	}
}

fn test_state(provider: Arc<StubProvider>) -> AppState {
	let books: Arc<dyn BookStore> = Arc::new(MemoryBookStore::new());
	let recents: Arc<dyn RecencyCappedStore<Entry = RecentSelection>> =
		Arc::new(MemoryRecency::new());
	let searches: Arc<dyn RecencyCappedStore<Entry = SearchEntry>> =
		Arc::new(MemoryRecency::new());
	let service = LibrisService::with_provider(
		test_config(),
		Stores { books, recents, searches },
		provider,
	);

	AppState::with_service(service)
}

fn basic_auth(username: &str) -> String {
	format!("Basic {}", BASE64.encode(format!("{username}:secret")))
}

async fn read_json(response: axum::response::Response) -> Value {
	let bytes = body::to_bytes(response.into_body(), usize::MAX)
		.await
		.expect("Failed to read response body.");

	serde_json::from_slice(&bytes).expect("Response body is not JSON.")
}

#[tokio::test]
async fn create_and_read_a_book() {
	let app = routes::router(test_state(Arc::new(StubProvider::default())));
	let payload = serde_json::json!({
		"title": "Dune",
		"author": "Frank Herbert",
		"publishYear": 1965,
		"rating": 5
	});
	let response = app
		.clone()
		.oneshot(
			Request::builder()
				.method("POST")
				.uri("/api/books/my-library")
				.header(header::CONTENT_TYPE, "application/json")
				.header(header::AUTHORIZATION, basic_auth("alice"))
				.body(Body::from(payload.to_string()))
				.expect("Failed to build request."),
		)
		.await
		.expect("Request failed.");

	assert_eq!(response.status(), StatusCode::OK);

	let created = read_json(response).await;
	let id = created["id"].as_str().expect("Expected an id.").to_string();

	assert_eq!(created["title"], "Dune");
	assert_eq!(created["coverMimeType"], "image/jpeg");

	let response = app
		.clone()
		.oneshot(
			Request::builder()
				.uri(format!("/api/books/my-library/{id}"))
				.header(header::AUTHORIZATION, basic_auth("alice"))
				.body(Body::empty())
				.expect("Failed to build request."),
		)
		.await
		.expect("Request failed.");

	assert_eq!(response.status(), StatusCode::OK);

	// A different authenticated caller sees a plain 404.
	let response = app
		.oneshot(
			Request::builder()
				.uri(format!("/api/books/my-library/{id}"))
				.header(header::AUTHORIZATION, basic_auth("bob"))
				.body(Body::empty())
				.expect("Failed to build request."),
		)
		.await
		.expect("Request failed.");

	assert_eq!(response.status(), StatusCode::NOT_FOUND);

	let error = read_json(response).await;

	assert_eq!(error["error_code"], "not_found");
}

#[tokio::test]
async fn create_without_credentials_is_unauthorized() {
	let app = routes::router(test_state(Arc::new(StubProvider::default())));
	let response = app
		.oneshot(
			Request::builder()
				.method("POST")
				.uri("/api/books/my-library")
				.header(header::CONTENT_TYPE, "application/json")
				.body(Body::from(r#"{"title":"Dune"}"#))
				.expect("Failed to build request."),
		)
		.await
		.expect("Request failed.");

	assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

	let error = read_json(response).await;

	assert_eq!(error["error_code"], "unauthenticated");
}

#[tokio::test]
async fn invalid_fields_report_field_level_detail() {
	let app = routes::router(test_state(Arc::new(StubProvider::default())));
	let response = app
		.oneshot(
			Request::builder()
				.method("POST")
				.uri("/api/books/my-library")
				.header(header::CONTENT_TYPE, "application/json")
				.header(header::AUTHORIZATION, basic_auth("alice"))
				.body(Body::from(r#"{"title":"Dune","rating":9}"#))
				.expect("Failed to build request."),
		)
		.await
		.expect("Request failed.");

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);

	let error = read_json(response).await;

	assert_eq!(error["error_code"], "validation_error");
	assert_eq!(error["fields"], serde_json::json!(["rating"]));
}

#[tokio::test]
async fn search_merges_saved_state() {
	let provider = Arc::new(StubProvider::default());

	*provider.search_results.lock().unwrap() = vec![WorkSummary {
		work_key: Some("/works/OL1W".to_string()),
		title: "Dune".to_string(),
		author: Some("Frank Herbert".to_string()),
		publish_year: Some(1_965),
		cover_id: Some(42),
	}];

	let app = routes::router(test_state(provider));
	let payload = serde_json::json!({ "title": "Dune", "workKey": "/works/OL1W" });
	let response = app
		.clone()
		.oneshot(
			Request::builder()
				.method("POST")
				.uri("/api/books/my-library")
				.header(header::CONTENT_TYPE, "application/json")
				.header(header::AUTHORIZATION, basic_auth("alice"))
				.body(Body::from(payload.to_string()))
				.expect("Failed to build request."),
		)
		.await
		.expect("Request failed.");

	assert_eq!(response.status(), StatusCode::OK);

	let created = read_json(response).await;
	let response = app
		.oneshot(
			Request::builder()
				.uri("/api/books/search?q=dune")
				.header(header::AUTHORIZATION, basic_auth("alice"))
				.body(Body::empty())
				.expect("Failed to build request."),
		)
		.await
		.expect("Request failed.");

	assert_eq!(response.status(), StatusCode::OK);

	let results = read_json(response).await;
	let rows = results.as_array().expect("Expected an array of results.");

	assert_eq!(rows.len(), 1);
	assert_eq!(rows[0]["saved"], true);
	assert_eq!(rows[0]["savedId"], created["id"]);
}

#[tokio::test]
async fn front_cover_serves_the_placeholder_with_its_mime_type() {
	let app = routes::router(test_state(Arc::new(StubProvider::default())));
	let payload = serde_json::json!({ "title": "Dune" });
	let response = app
		.clone()
		.oneshot(
			Request::builder()
				.method("POST")
				.uri("/api/books/my-library")
				.header(header::CONTENT_TYPE, "application/json")
				.header(header::AUTHORIZATION, basic_auth("alice"))
				.body(Body::from(payload.to_string()))
				.expect("Failed to build request."),
		)
		.await
		.expect("Request failed.");
	let created = read_json(response).await;
	let id = created["id"].as_str().expect("Expected an id.");
	let response = app
		.oneshot(
			Request::builder()
				.uri(format!("/api/books/front-cover/{id}"))
				.body(Body::empty())
				.expect("Failed to build request."),
		)
		.await
		.expect("Request failed.");

	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(
		response.headers().get(header::CONTENT_TYPE).and_then(|value| value.to_str().ok()),
		Some("image/png"),
	);

	let bytes = body::to_bytes(response.into_body(), usize::MAX)
		.await
		.expect("Failed to read cover body.");

	assert!(!bytes.is_empty());
}
