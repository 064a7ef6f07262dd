use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use libris_service::{
	AddRecentRequest, BookView, CreateBookRequest, DeleteBookResponse, ListBooksRequest,
	SearchEntryView, SearchResultView, ServiceError, UpdateBookRequest,
};

use crate::{auth::auth_context, state::AppState};

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/api/books/search", get(search))
		.route("/api/books/home", get(home))
		.route("/api/books/last-search", get(last_search))
		.route("/api/books/my-library", get(list_library).post(create_in_library))
		.route(
			"/api/books/my-library/{id}",
			get(get_from_library).put(update_library).delete(remove_from_library),
		)
		.route("/api/books/front-cover/{id}", get(front_cover))
		// Kept for clients using the older library-prefixed cover path.
		.route("/api/books/library/front-cover/{id}", get(front_cover))
		.route("/api/books/recent", axum::routing::post(add_recent))
		.route("/api/recents/list", get(list_recents))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

#[derive(Debug, Deserialize)]
struct SearchParams {
	q: String,
}

async fn search(
	State(state): State<AppState>,
	headers: HeaderMap,
	Query(params): Query<SearchParams>,
) -> Result<Json<Vec<SearchResultView>>, ApiError> {
	let ctx = auth_context(&headers);
	let response = state.service.search(&ctx, &params.q).await?;
	Ok(Json(response))
}

async fn home(
	State(state): State<AppState>,
	headers: HeaderMap,
) -> Result<Json<Vec<SearchResultView>>, ApiError> {
	let ctx = auth_context(&headers);
	let response = state.service.home(&ctx).await?;
	Ok(Json(response))
}

async fn last_search(
	State(state): State<AppState>,
	headers: HeaderMap,
) -> Result<Json<Vec<SearchEntryView>>, ApiError> {
	let ctx = auth_context(&headers);
	let response = state.service.last_searches(&ctx).await?;
	Ok(Json(response))
}

async fn create_in_library(
	State(state): State<AppState>,
	headers: HeaderMap,
	Json(payload): Json<CreateBookRequest>,
) -> Result<Json<BookView>, ApiError> {
	let ctx = auth_context(&headers);
	let response = state.service.create_book(&ctx, payload).await?;
	Ok(Json(response))
}

async fn get_from_library(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path(id): Path<Uuid>,
) -> Result<Json<BookView>, ApiError> {
	let ctx = auth_context(&headers);
	let response = state.service.get_book(&ctx, id).await?;
	Ok(Json(response))
}

async fn update_library(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path(id): Path<Uuid>,
	Json(payload): Json<UpdateBookRequest>,
) -> Result<Json<BookView>, ApiError> {
	let ctx = auth_context(&headers);
	let response = state.service.update_book(&ctx, id, payload).await?;
	Ok(Json(response))
}

async fn remove_from_library(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path(id): Path<Uuid>,
) -> Result<Json<DeleteBookResponse>, ApiError> {
	let ctx = auth_context(&headers);
	let response = state.service.delete_book(&ctx, id).await?;
	Ok(Json(response))
}

async fn list_library(
	State(state): State<AppState>,
	headers: HeaderMap,
	Query(params): Query<ListBooksRequest>,
) -> Result<Json<Vec<BookView>>, ApiError> {
	let ctx = auth_context(&headers);
	let response = state.service.list_books(&ctx, params).await?;
	Ok(Json(response))
}

async fn front_cover(
	State(state): State<AppState>,
	Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
	let cover = state.service.front_cover(id).await?;
	Ok(([(header::CONTENT_TYPE, cover.mime_type)], cover.bytes).into_response())
}

#[derive(Debug, Serialize)]
struct OkBody {
	ok: bool,
}

async fn add_recent(
	State(state): State<AppState>,
	headers: HeaderMap,
	Json(payload): Json<AddRecentRequest>,
) -> Result<Json<OkBody>, ApiError> {
	let ctx = auth_context(&headers);
	state.service.add_recent(&ctx, payload).await?;
	Ok(Json(OkBody { ok: true }))
}

async fn list_recents(
	State(state): State<AppState>,
	headers: HeaderMap,
) -> Result<Json<Vec<libris_service::RecentView>>, ApiError> {
	let ctx = auth_context(&headers);
	let response = state.service.list_recents(&ctx).await?;
	Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}

impl ApiError {
	fn new(
		status: StatusCode,
		error_code: impl Into<String>,
		message: impl Into<String>,
		fields: Option<Vec<String>>,
	) -> Self {
		Self {
			status,
			error_code: error_code.into(),
			message: message.into(),
			fields,
		}
	}
}

impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		let message = err.to_string();

		match err {
			ServiceError::Unauthenticated => {
				Self::new(StatusCode::UNAUTHORIZED, "unauthenticated", message, None)
			},
			ServiceError::NotFound => {
				Self::new(StatusCode::NOT_FOUND, "not_found", message, None)
			},
			ServiceError::Validation { field, .. } => Self::new(
				StatusCode::BAD_REQUEST,
				"validation_error",
				message,
				Some(vec![field]),
			),
			ServiceError::StoreUnavailable { .. } => {
				Self::new(StatusCode::SERVICE_UNAVAILABLE, "store_unavailable", message, None)
			},
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody {
			error_code: self.error_code,
			message: self.message,
			fields: self.fields,
		};
		(self.status, Json(body)).into_response()
	}
}
