//! Client for an external render service that turns arbitrary documents into preview
//! images.
//!
//! The source file is posted as `multipart/form-data` with the fields `width`,
//! `height`, `name` and `file`. The service answers with the image bytes, and its
//! `Content-Type` decides whether the preview is stored as `.png` or `.jpg`.

mod error;
pub mod multipart;

pub use error::{Error, Result};

use fm_utils::{error::FileIOError, with_appended_extension};

use std::{path::Path, time::Duration};

use futures::StreamExt;
use multipart::EncodeError;
use reqwest::{header, Body, Client, Response};
use tokio::{
	fs::{self, File},
	io::{AsyncRead, AsyncWriteExt},
	task::JoinHandle,
	time::timeout,
};
use tracing::{debug, instrument, trace, warn};
use url::Url;

pub const JPEG_EXTENSION: &str = ".jpg";
pub const PNG_EXTENSION: &str = ".png";

/// Used when no timeout is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// How long a failed request waits for the encoder to explain the failure.
const ENCODER_GRACE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct RenderProxy {
	client: Client,
	endpoint: Url,
}

/// The encoder task feeding a request body. Aborted when dropped, so it never
/// outlives the request on any exit path.
struct EncoderTask(Option<JoinHandle<std::result::Result<(), EncodeError>>>);

impl EncoderTask {
	/// Wait for the encoder to stop. `None` if it was cancelled.
	async fn join(&mut self) -> Option<std::result::Result<(), EncodeError>> {
		let handle = self.0.as_mut()?;
		let res = handle.await.ok();
		self.0 = None;
		res
	}
}

impl Drop for EncoderTask {
	fn drop(&mut self) {
		if let Some(handle) = self.0.take() {
			handle.abort();
		}
	}
}

impl RenderProxy {
	/// Create a client for the service at `endpoint`. Every render, upload and
	/// download included, must complete within `timeout`.
	pub fn new(endpoint: Url, timeout: Duration) -> Result<Self> {
		let client = Client::builder()
			.timeout(timeout)
			.build()
			.map_err(Error::Client)?;

		Ok(Self { client, endpoint })
	}

	#[must_use]
	pub fn endpoint(&self) -> &Url {
		&self.endpoint
	}

	/// Send `source` to the render service and store the answer at `dest_base` plus
	/// the extension matching its content type, which is returned.
	#[instrument(
		skip(self, source, dest_base),
		fields(endpoint = %self.endpoint, dest_base = %dest_base.as_ref().display()),
		err
	)]
	pub async fn render(
		&self,
		source: impl AsyncRead + Send + Unpin + 'static,
		dest_base: impl AsRef<Path> + Send,
		file_name: &str,
		width: u32,
		height: u32,
	) -> Result<&'static str> {
		let (mut form, body) = multipart::pipe();
		let content_type = form.content_type();

		let mut encoder = EncoderTask(Some(tokio::spawn({
			let file_name = file_name.to_string();
			async move {
				form.write_field("width", &width.to_string()).await?;
				form.write_field("height", &height.to_string()).await?;
				form.write_field("name", &file_name).await?;
				let written = form.write_file("file", &file_name, source).await?;
				trace!(written, "Source fully streamed to the render service");
				form.finish().await
			}
		})));

		// The request consumes the body while the encoder task is still producing it
		let response = match self
			.client
			.post(self.endpoint.clone())
			.header(header::CONTENT_TYPE, content_type)
			.body(Body::wrap_stream(body))
			.send()
			.await
		{
			Ok(response) => response,
			Err(e) => {
				// A failing source aborts the body, report that instead of the transport
				let outcome = timeout(ENCODER_GRACE, encoder.join()).await.ok().flatten();
				return Err(match outcome {
					Some(Err(EncodeError::Source(source_err))) => Error::SourceRead(source_err),
					_ => Error::from_transport(e),
				});
			}
		};

		drop(encoder);

		let status = response.status();
		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			return Err(Error::RenderService {
				status: status.as_u16(),
				body,
			});
		}

		let ext = if is_png(&response) {
			PNG_EXTENSION
		} else {
			JPEG_EXTENSION
		};

		let output_path = with_appended_extension(dest_base, ext);
		debug!(output_path = %output_path.display(), "Saving rendered preview");

		let mut file = File::create(&output_path)
			.await
			.map_err(|e| Error::Write(FileIOError::from((&output_path, e))))?;

		if let Err(e) = save_body(response, &mut file, &output_path).await {
			drop(file);
			// Never leave a truncated image behind where it would be served as a preview
			if let Err(remove_err) = fs::remove_file(&output_path).await {
				warn!(%remove_err, "Failed to remove partially written preview");
			}
			return Err(e);
		}

		Ok(ext)
	}
}

fn is_png(response: &Response) -> bool {
	response
		.headers()
		.get(header::CONTENT_TYPE)
		.and_then(|value| value.to_str().ok())
		.and_then(|value| value.split(';').next())
		.is_some_and(|mime| mime.trim().eq_ignore_ascii_case("image/png"))
}

async fn save_body(response: Response, file: &mut File, output_path: &Path) -> Result<()> {
	let mut chunks = response.bytes_stream();

	while let Some(chunk) = chunks.next().await {
		let chunk = chunk.map_err(Error::Unavailable)?;
		file.write_all(&chunk)
			.await
			.map_err(|e| Error::Write(FileIOError::from((output_path, e))))?;
	}

	file.flush()
		.await
		.map_err(|e| Error::Write(FileIOError::from((output_path, e))))
}
