use std::path::{Path, PathBuf};

pub mod error;

/// Format a requested box as used in preview cache names, eg. `100x100`.
#[must_use]
pub fn dimensions_suffix(width: u32, height: u32) -> String {
	format!("{width}x{height}")
}

/// Append `ext` (with its leading dot) to the final component of `base`, keeping
/// any dots already present in the name: `photo.png___10x10` + `.jpg`.
#[must_use]
pub fn with_appended_extension(base: impl AsRef<Path>, ext: &str) -> PathBuf {
	let mut path = base.as_ref().as_os_str().to_owned();
	path.push(ext);
	PathBuf::from(path)
}
