//! A `multipart/form-data` encoder that writes into a bounded channel.
//!
//! The reading half of the channel is handed to the http client as the request body,
//! so the form is produced at the pace the network consumes it and a file part never
//! has to be held in memory as a whole.

use std::io;

use bytes::Bytes;
use futures::StreamExt;
use tokio::{io::AsyncRead, sync::mpsc};
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::io::ReaderStream;
use uuid::Uuid;

/// Size of the chunks a file part is read in.
pub const CHUNK_CAPACITY: usize = 64 * 1024;

/// How many chunks may wait in the pipe before the encoder has to wait for the client.
pub const PIPE_CAPACITY: usize = 8;

/// The reading half of the pipe, to be wrapped into a request body.
pub type BodyStream = ReceiverStream<io::Result<Bytes>>;

#[derive(thiserror::Error, Debug)]
pub enum EncodeError {
	#[error("request body was dropped before the form was complete")]
	Closed,
	#[error("failed to read part content: {0}")]
	Source(#[from] io::Error),
}

/// Writing half of the pipe.
#[derive(Debug)]
pub struct MultipartWriter {
	boundary: String,
	tx: mpsc::Sender<io::Result<Bytes>>,
}

/// Create a connected encoder and request body.
#[must_use]
pub fn pipe() -> (MultipartWriter, BodyStream) {
	let (tx, rx) = mpsc::channel(PIPE_CAPACITY);

	(
		MultipartWriter {
			boundary: Uuid::new_v4().simple().to_string(),
			tx,
		},
		ReceiverStream::new(rx),
	)
}

impl MultipartWriter {
	#[must_use]
	pub fn boundary(&self) -> &str {
		&self.boundary
	}

	/// Value for the `Content-Type` header of the request carrying this form.
	#[must_use]
	pub fn content_type(&self) -> String {
		format!("multipart/form-data; boundary={}", self.boundary)
	}

	async fn send(&self, bytes: impl Into<Bytes>) -> Result<(), EncodeError> {
		self.tx
			.send(Ok(bytes.into()))
			.await
			.map_err(|_| EncodeError::Closed)
	}

	/// Write a plain text field.
	pub async fn write_field(&mut self, name: &str, value: &str) -> Result<(), EncodeError> {
		let mut part = format!(
			"--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n",
			self.boundary,
			encode_param(name)
		);
		part.push_str(value);
		part.push_str("\r\n");

		self.send(part).await
	}

	/// Write a file part, streaming `reader` until EOF. Returns the number of content
	/// bytes written.
	///
	/// A read failure is forwarded into the pipe before being returned, so the request
	/// consuming the body fails instead of waiting for more data.
	pub async fn write_file(
		&mut self,
		name: &str,
		file_name: &str,
		reader: impl AsyncRead + Unpin,
	) -> Result<u64, EncodeError> {
		self.send(format!(
			"--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
			self.boundary,
			encode_param(name),
			encode_param(file_name)
		))
		.await?;

		let mut chunks = ReaderStream::with_capacity(reader, CHUNK_CAPACITY);
		let mut written = 0_u64;

		while let Some(chunk) = chunks.next().await {
			match chunk {
				Ok(chunk) => {
					written = written
						.saturating_add(u64::try_from(chunk.len()).unwrap_or(u64::MAX));
					self.send(chunk).await?;
				}
				Err(e) => {
					// If the body is already gone there is nobody left to tell
					let _ = self
						.tx
						.send(Err(io::Error::new(e.kind(), e.to_string())))
						.await;
					return Err(EncodeError::Source(e));
				}
			}
		}

		self.send(Bytes::from_static(b"\r\n")).await?;

		Ok(written)
	}

	/// Write the closing boundary and close the pipe.
	pub async fn finish(self) -> Result<(), EncodeError> {
		self.send(format!("--{}--\r\n", self.boundary)).await
	}
}

/// Percent-encode the characters that could end a quoted header parameter or the
/// header line itself, the way browsers encode form names.
fn encode_param(value: &str) -> String {
	value
		.replace('"', "%22")
		.replace('\r', "%0D")
		.replace('\n', "%0A")
}

#[cfg(test)]
mod tests {
	use super::*;

	use std::{
		pin::Pin,
		task::{Context, Poll},
	};

	use tokio::io::ReadBuf;

	async fn collect(body: BodyStream) -> (Vec<u8>, Option<io::Error>) {
		let mut body = body;
		let mut out = Vec::new();
		while let Some(chunk) = body.next().await {
			match chunk {
				Ok(bytes) => out.extend_from_slice(&bytes),
				Err(e) => return (out, Some(e)),
			}
		}
		(out, None)
	}

	#[tokio::test]
	async fn encodes_fields_and_file() {
		let (mut form, body) = pipe();
		let boundary = form.boundary().to_string();
		assert_eq!(
			form.content_type(),
			format!("multipart/form-data; boundary={boundary}")
		);

		let reader = tokio::spawn(collect(body));

		form.write_field("width", "200").await.expect("width");
		form.write_field("name", "my \"doc\".pdf").await.expect("name");
		let written = form
			.write_file("file", "my \"doc\".pdf", &b"%PDF-1.4"[..])
			.await
			.expect("file");
		form.finish().await.expect("finish");

		assert_eq!(written, 8);

		let (bytes, err) = reader.await.expect("reader task");
		assert!(err.is_none());
		assert_eq!(
			String::from_utf8(bytes).expect("utf8"),
			format!(
				"--{boundary}\r\nContent-Disposition: form-data; name=\"width\"\r\n\r\n200\r\n\
				--{boundary}\r\nContent-Disposition: form-data; name=\"name\"\r\n\r\nmy \"doc\".pdf\r\n\
				--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"my %22doc%22.pdf\"\r\n\
				Content-Type: application/octet-stream\r\n\r\n%PDF-1.4\r\n\
				--{boundary}--\r\n"
			)
		);
	}

	#[tokio::test]
	async fn line_breaks_in_names_stay_inside_the_header() {
		let (mut form, body) = pipe();
		let boundary = form.boundary().to_string();
		let reader = tokio::spawn(collect(body));

		form.write_file("file\r\n", "evil.pdf\r\nX-Injected: 1\r\n", &b"x"[..])
			.await
			.expect("file");
		form.finish().await.expect("finish");

		let (bytes, err) = reader.await.expect("reader task");
		assert!(err.is_none());
		let body = String::from_utf8(bytes).expect("utf8");

		assert!(!body.contains("\r\nX-Injected: 1\r\n"), "{body:?}");
		assert_eq!(
			body,
			format!(
				"--{boundary}\r\nContent-Disposition: form-data; name=\"file%0D%0A\"; \
				filename=\"evil.pdf%0D%0AX-Injected: 1%0D%0A\"\r\n\
				Content-Type: application/octet-stream\r\n\r\nx\r\n\
				--{boundary}--\r\n"
			)
		);
	}

	#[tokio::test]
	async fn large_file_is_streamed_in_bounded_chunks() {
		let (mut form, mut body) = pipe();
		let content = vec![7_u8; CHUNK_CAPACITY * (PIPE_CAPACITY * 4)];

		let writer = tokio::spawn(async move {
			let written = form.write_file("file", "big.bin", &content[..]).await?;
			form.finish().await?;
			Ok::<_, EncodeError>(written)
		});

		// Nothing is read yet, so the encoder must be parked on a full pipe
		tokio::task::yield_now().await;
		assert!(!writer.is_finished());

		let mut total = 0;
		while let Some(chunk) = body.next().await {
			let chunk = chunk.expect("no errors");
			assert!(chunk.len() <= CHUNK_CAPACITY + 256);
			total += chunk.len();
		}

		let written = writer.await.expect("join").expect("encoded");
		assert_eq!(
			written,
			u64::try_from(CHUNK_CAPACITY * PIPE_CAPACITY * 4).expect("fits")
		);
		assert!(total > CHUNK_CAPACITY * PIPE_CAPACITY * 4);
	}

	struct FailingReader;

	impl AsyncRead for FailingReader {
		fn poll_read(
			self: Pin<&mut Self>,
			_cx: &mut Context<'_>,
			_buf: &mut ReadBuf<'_>,
		) -> Poll<io::Result<()>> {
			Poll::Ready(Err(io::Error::new(io::ErrorKind::Other, "disk on fire")))
		}
	}

	#[tokio::test]
	async fn read_errors_reach_the_body() {
		let (mut form, body) = pipe();
		let reader = tokio::spawn(collect(body));

		let err = form
			.write_file("file", "x", FailingReader)
			.await
			.expect_err("reader fails");
		assert!(matches!(err, EncodeError::Source(_)));
		drop(form);

		let (_, err) = reader.await.expect("reader task");
		assert_eq!(err.expect("error forwarded").to_string(), "disk on fire");
	}

	#[tokio::test]
	async fn dropped_body_stops_the_encoder() {
		let (mut form, body) = pipe();
		drop(body);

		assert!(matches!(
			form.write_field("width", "1").await,
			Err(EncodeError::Closed)
		));
	}
}
