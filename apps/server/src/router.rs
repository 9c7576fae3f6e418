use fm_core::{preview::Error as PreviewError, FileKind, PreviewManager, PreviewRequest};

use std::{
	collections::BTreeMap,
	fmt::Debug,
	io,
	panic::Location,
	path::Path,
	sync::Arc,
	time::Duration,
};

use axum::{
	body::Body,
	extract::{Path as UrlPath, Query, State},
	http::{self, header, HeaderName, Method, StatusCode},
	response::{IntoResponse, Response},
	routing::get,
	Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tower_http::{
	catch_panic::CatchPanicLayer,
	cors::{Any, CorsLayer},
	trace::TraceLayer,
};
use tracing::{debug, error};

#[derive(Clone)]
struct AppState {
	previews: Arc<PreviewManager>,
}

/// Query of `GET /preview`. Missing values are left empty and rejected while
/// parsing the request, same as malformed ones.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PreviewQuery {
	id: String,
	width: String,
	height: String,
}

#[derive(Debug, Serialize)]
struct Features {
	preview: BTreeMap<FileKind, bool>,
}

pub fn router(previews: Arc<PreviewManager>) -> Router {
	Router::new()
		.route("/preview", get(get_preview))
		.route("/icons/:size/:kind/:name", get(get_icon))
		.route("/features", get(get_features))
		.route("/health", get(|| async { "OK" }))
		.layer(CatchPanicLayer::new())
		.layer(cors())
		.layer(TraceLayer::new_for_http())
		.with_state(AppState { previews })
}

fn cors() -> CorsLayer {
	CorsLayer::new()
		.allow_origin(Any)
		.allow_methods([
			Method::GET,
			Method::POST,
			Method::PUT,
			Method::DELETE,
			Method::OPTIONS,
		])
		.allow_headers([
			header::ACCEPT,
			header::AUTHORIZATION,
			header::CONTENT_TYPE,
			HeaderName::from_static("x-csrf-token"),
		])
		.max_age(Duration::from_secs(300))
}

async fn get_preview(
	State(state): State<AppState>,
	Query(query): Query<PreviewQuery>,
) -> Result<Response, Response> {
	// Refused before anything else, even malformed requests
	if !state.previews.is_enabled() {
		return Err(preview_error(&PreviewError::PreviewsDisabled));
	}

	let request = PreviewRequest::parse(query.id, &query.width, &query.height)
		.map_err(|e| preview_error(&e))?;

	let preview = state
		.previews
		.get_preview(&request)
		.await
		.map_err(|e| preview_error(&e))?;

	serve_file(preview.path()).await
}

async fn get_icon(
	State(state): State<AppState>,
	UrlPath((size, kind, name)): UrlPath<(String, String, String)>,
) -> Result<Response, Response> {
	serve_file(&state.previews.icons().resolve(&size, &kind, &name)).await
}

async fn get_features(State(state): State<AppState>) -> Json<Features> {
	Json(Features {
		preview: state.previews.features(),
	})
}

async fn serve_file(path: &Path) -> Result<Response, Response> {
	let file = File::open(path).await.map_err(|e| {
		if e.kind() == io::ErrorKind::NotFound {
			not_found(path)
		} else {
			internal_server_error(e)
		}
	})?;

	let metadata = file.metadata().await.map_err(internal_server_error)?;
	if !metadata.is_file() {
		return Err(not_found(path));
	}

	let content_type = mime_guess::from_path(path).first_or_octet_stream();

	http::Response::builder()
		.status(StatusCode::OK)
		.header(header::CONTENT_TYPE, content_type.as_ref())
		.header(header::CONTENT_LENGTH, metadata.len())
		.body(Body::from_stream(ReaderStream::new(file)))
		.map_err(internal_server_error)
}

/// Preview failures are all reported as 500 with the error message as body.
#[track_caller]
fn preview_error(err: &PreviewError) -> Response {
	debug!("500 - {err} at {}: {err:?}", Location::caller());

	(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
}

#[track_caller]
fn not_found(err: impl Debug) -> Response {
	debug!("404 - Not Found at {}: {err:?}", Location::caller());

	StatusCode::NOT_FOUND.into_response()
}

#[track_caller]
fn internal_server_error(err: impl Debug) -> Response {
	error!(
		"500 - Internal Server Error at {}: {err:?}",
		Location::caller()
	);

	StatusCode::INTERNAL_SERVER_ERROR.into_response()
}
