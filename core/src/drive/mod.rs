//! The storage a preview source is read from.

use fm_utils::error::FileIOError;

use std::path::PathBuf;

use async_trait::async_trait;
use serde::Serialize;
use tokio::io::AsyncRead;

mod kind;
mod local;

pub use kind::FileKind;
pub use local::LocalDrive;

pub type Result<T> = std::result::Result<T, Error>;

/// A byte stream over a file's content.
pub type FileReader = Box<dyn AsyncRead + Send + Unpin>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
	#[error("'{0}' points outside of the drive")]
	OutsideRoot(String),
	#[error("'{0}' not found")]
	NotFound(String),
	#[error("'{0}' is not a regular file")]
	NotAFile(String),
	#[error(transparent)]
	FileIO(#[from] FileIOError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileInfo {
	pub id: String,
	pub name: String,
	pub size: u64,
	#[serde(rename = "type")]
	pub kind: FileKind,
}

impl FileInfo {
	/// Lowercase extension of the name, without the dot.
	#[must_use]
	pub fn extension(&self) -> Option<String> {
		kind::extension_of(&self.name)
	}
}

/// Lookup and read access by file id, a `/` separated path relative to the drive root.
#[async_trait]
pub trait Drive: Send + Sync {
	/// Location of `id` on the local filesystem, where its preview cache lives.
	fn resolve(&self, id: &str) -> Result<PathBuf>;

	async fn info(&self, id: &str) -> Result<FileInfo>;

	async fn read(&self, id: &str) -> Result<FileReader>;
}
