//! Static fallback icons for files that have no real preview.
//!
//! Icons live on disk as `<icons_dir>/<size>/<name>` for per-extension icons and
//! `<icons_dir>/<size>/types/<type><ext>` for the generic per-type icon.

use std::path::{Path, PathBuf};

use tracing::trace;

/// Directory, under each size tier, holding the generic per-type icons.
pub const TYPES_DIR_NAME: &str = "types";

/// Resolves icon paths below a fixed icons directory.
#[derive(Debug, Clone)]
pub struct IconResolver {
	icons_dir: PathBuf,
}

impl IconResolver {
	pub fn new(icons_dir: impl Into<PathBuf>) -> Self {
		Self {
			icons_dir: icons_dir.into(),
		}
	}

	#[must_use]
	pub fn icons_dir(&self) -> &Path {
		&self.icons_dir
	}

	/// Pick the icon for `name` (eg. `pdf.svg`) at the given size tier, falling back
	/// to the generic icon of `kind` (eg. `document`) if there is no dedicated one.
	///
	/// Every input is reduced to `[A-Za-z0-9.]` with leading dots removed, so the
	/// result always stays below the icons directory.
	pub fn resolve(&self, size: &str, kind: &str, name: &str) -> PathBuf {
		let size = sanitize(size);
		let name = sanitize(name);

		let tier = self.icons_dir.join(&size);
		let candidate = tier.join(&name);

		if candidate.is_file() {
			return candidate;
		}

		let ext = Path::new(&name)
			.extension()
			.and_then(|ext| ext.to_str())
			.map(|ext| format!(".{ext}"))
			.unwrap_or_default();

		let fallback = tier
			.join(TYPES_DIR_NAME)
			.join(format!("{}{ext}", sanitize(kind)));

		trace!(
			candidate = %candidate.display(),
			fallback = %fallback.display(),
			"No dedicated icon, using the type icon"
		);

		fallback
	}
}

/// Strip everything outside `[A-Za-z0-9.]`, then any leading dots, so the value can
/// neither contain a separator nor be `.`/`..` or a hidden file.
#[must_use]
pub fn sanitize(value: &str) -> String {
	let kept = value
		.chars()
		.filter(|c| c.is_ascii_alphanumeric() || *c == '.')
		.collect::<String>();

	kept.trim_start_matches('.').to_string()
}
