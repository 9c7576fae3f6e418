//! On-disk preview cache, kept next to the sources:
//! `<folder>/.preview/<name>___<width>x<height>.{jpg,png}`.
//!
//! A zero length `.jpg` under a key records that rendering it failed, and is never
//! served as an image.

use fm_render_proxy::{JPEG_EXTENSION, PNG_EXTENSION};
use fm_utils::{dimensions_suffix, error::FileIOError, with_appended_extension};

use std::{
	fmt,
	io::ErrorKind,
	path::{Path, PathBuf},
};

use tokio::fs;
use tracing::warn;

pub const PREVIEW_DIR_NAME: &str = ".preview";
pub const KEY_SEPARATOR: &str = "___";

/// Extensions a preview can be stored with, in probing order.
pub const PREVIEW_EXTENSIONS: [&str; 2] = [JPEG_EXTENSION, PNG_EXTENSION];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEntry {
	Positive(PathBuf),
	Negative,
}

/// Identifies the preview of one source at one requested size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKey {
	folder: PathBuf,
	file_name: String,
	base: PathBuf,
}

impl CacheKey {
	/// `None` if `source` has no parent folder or no name, like a drive root.
	#[must_use]
	pub fn new(source: &Path, width: u32, height: u32) -> Option<Self> {
		let name = source.file_name()?;
		let folder = source.parent()?.join(PREVIEW_DIR_NAME);

		let mut base_name = name.to_os_string();
		base_name.push(KEY_SEPARATOR);
		base_name.push(dimensions_suffix(width, height));

		Some(Self {
			base: folder.join(base_name),
			file_name: name.to_string_lossy().into_owned(),
			folder,
		})
	}

	/// The `.preview` folder holding this entry.
	#[must_use]
	pub fn folder(&self) -> &Path {
		&self.folder
	}

	/// Name of the source file.
	#[must_use]
	pub fn file_name(&self) -> &str {
		&self.file_name
	}

	/// Entry path without extension.
	#[must_use]
	pub fn base(&self) -> &Path {
		&self.base
	}

	#[must_use]
	pub fn path_with(&self, ext: &str) -> PathBuf {
		with_appended_extension(&self.base, ext)
	}

	/// Look the entry up, `.jpg` first. Files that can't be inspected count as absent.
	pub async fn probe(&self) -> Option<CacheEntry> {
		for ext in PREVIEW_EXTENSIONS {
			let path = self.path_with(ext);

			match fs::metadata(&path).await {
				Ok(metadata) if metadata.len() > 0 => return Some(CacheEntry::Positive(path)),
				Ok(_) => return Some(CacheEntry::Negative),
				Err(e) if e.kind() == ErrorKind::NotFound => {}
				Err(e) => {
					warn!(path = %path.display(), error = %e, "Failed to probe preview cache");
				}
			}
		}

		None
	}

	/// Create the `.preview` folder, fine if someone else already did.
	pub async fn create_folder(&self) -> Result<(), FileIOError> {
		match fs::create_dir(&self.folder).await {
			Ok(()) => Ok(()),
			Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(()),
			Err(e) => Err(FileIOError::from((
				&self.folder,
				e,
				"Failed to create preview folder",
			))),
		}
	}

	/// Record a failed render so it isn't attempted again.
	pub async fn write_placeholder(&self) -> Result<(), FileIOError> {
		let path = self.path_with(JPEG_EXTENSION);

		fs::write(&path, b"")
			.await
			.map_err(|e| FileIOError::from((&path, e, "Failed to write preview placeholder")))
	}
}

impl fmt::Display for CacheKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.base.display())
	}
}
