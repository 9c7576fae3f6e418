use super::{Drive, Error, FileInfo, FileKind, FileReader, Result};

use fm_utils::error::FileIOError;

use std::{
	io::ErrorKind,
	path::{Component, Path, PathBuf},
};

use async_trait::async_trait;
use tokio::fs::{self, File};
use tracing::trace;

/// A drive backed by a folder on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalDrive {
	root: PathBuf,
}

impl LocalDrive {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self { root: root.into() }
	}

	#[must_use]
	pub fn root(&self) -> &Path {
		&self.root
	}

	fn io_error(&self, id: &str, path: &Path, e: std::io::Error) -> Error {
		if e.kind() == ErrorKind::NotFound {
			Error::NotFound(id.to_string())
		} else {
			FileIOError::from((path, e)).into()
		}
	}
}

#[async_trait]
impl Drive for LocalDrive {
	fn resolve(&self, id: &str) -> Result<PathBuf> {
		let mut path = self.root.clone();

		for component in Path::new(id).components() {
			match component {
				Component::Normal(segment) => path.push(segment),
				Component::RootDir | Component::CurDir => {}
				Component::ParentDir | Component::Prefix(_) => {
					return Err(Error::OutsideRoot(id.to_string()))
				}
			}
		}

		Ok(path)
	}

	async fn info(&self, id: &str) -> Result<FileInfo> {
		let path = self.resolve(id)?;
		let metadata = fs::metadata(&path)
			.await
			.map_err(|e| self.io_error(id, &path, e))?;

		let name = path
			.file_name()
			.map(|name| name.to_string_lossy().into_owned())
			.unwrap_or_default();

		let kind = if metadata.is_dir() {
			FileKind::Folder
		} else {
			FileKind::from_name(&name)
		};

		trace!(%id, %kind, size = metadata.len(), "Resolved file info");

		Ok(FileInfo {
			id: id.to_string(),
			name,
			size: metadata.len(),
			kind,
		})
	}

	async fn read(&self, id: &str) -> Result<FileReader> {
		let path = self.resolve(id)?;
		let file = File::open(&path)
			.await
			.map_err(|e| self.io_error(id, &path, e))?;

		let metadata = file
			.metadata()
			.await
			.map_err(|e| self.io_error(id, &path, e))?;
		if !metadata.is_file() {
			return Err(Error::NotAFile(id.to_string()));
		}

		let reader: FileReader = Box::new(file);
		Ok(reader)
	}
}
