use fm_utils::error::FileIOError;

use std::io;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
	#[error("render service answered with status {status}: {body}")]
	RenderService { status: u16, body: String },
	#[error("render service unavailable: {0}")]
	Unavailable(#[source] reqwest::Error),
	#[error("render request could not be built for this endpoint: {0}")]
	InvalidEndpoint(#[source] reqwest::Error),
	#[error("failed to build the http client: {0}")]
	Client(#[source] reqwest::Error),
	#[error("failed to read the source file while streaming it: {0}")]
	SourceRead(#[source] io::Error),
	#[error("failed to write the rendered preview: {0}")]
	Write(#[source] FileIOError),
}

impl Error {
	/// Map a client error to the service being unreachable, unless it never left
	/// the building because the request itself was invalid.
	pub(crate) fn from_transport(e: reqwest::Error) -> Self {
		if e.is_builder() {
			Self::InvalidEndpoint(e)
		} else {
			Self::Unavailable(e)
		}
	}
}
