use std::{
	net::Ipv4Addr,
	sync::{
		atomic::{AtomicU16, AtomicUsize, Ordering},
		Arc,
	},
	time::Duration,
};

use axum::{
	extract::{DefaultBodyLimit, Multipart, State},
	http::{header, StatusCode},
	response::{IntoResponse, Response},
	routing::post,
	Router,
};
use fm_core::RenderEndpoint;
use tokio::{net::TcpListener, time::sleep};

pub const RENDERED_PNG: &[u8] = b"\x89PNG\r\n\x1a\nrendered";

/// An in-process render service that answers every request with the same status.
#[derive(Clone, Default)]
pub struct FakeRenderService {
	status: Arc<AtomicU16>,
	hits: Arc<AtomicUsize>,
	delay: Duration,
}

impl FakeRenderService {
	pub fn new(status: StatusCode) -> Self {
		Self {
			status: Arc::new(AtomicU16::new(status.as_u16())),
			..Default::default()
		}
	}

	pub fn with_delay(mut self, delay: Duration) -> Self {
		self.delay = delay;
		self
	}

	pub fn set_status(&self, status: StatusCode) {
		self.status.store(status.as_u16(), Ordering::SeqCst);
	}

	/// Requests that reached the service so far.
	pub fn hits(&self) -> usize {
		self.hits.load(Ordering::SeqCst)
	}

	pub async fn spawn(&self) -> RenderEndpoint {
		let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
		let addr = listener.local_addr().unwrap();

		let app = Router::new()
			.route("/render", post(render))
			.layer(DefaultBodyLimit::disable())
			.with_state(self.clone());

		tokio::spawn(async move {
			axum::serve(listener, app).await.unwrap();
		});

		format!("http://{addr}/render").parse().unwrap()
	}
}

async fn render(State(service): State<FakeRenderService>, mut multipart: Multipart) -> Response {
	service.hits.fetch_add(1, Ordering::SeqCst);

	// Drain the form so the client finishes uploading before we answer
	while let Ok(Some(field)) = multipart.next_field().await {
		if field.bytes().await.is_err() {
			return StatusCode::BAD_REQUEST.into_response();
		}
	}

	sleep(service.delay).await;

	let status = StatusCode::from_u16(service.status.load(Ordering::SeqCst)).unwrap();
	if status.is_success() {
		(status, [(header::CONTENT_TYPE, "image/png")], RENDERED_PNG).into_response()
	} else {
		(status, "renderer unavailable").into_response()
	}
}
