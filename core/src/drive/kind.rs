use std::path::Path;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Broad file type, used to pick a renderer and to key the generic icons.
#[derive(
	Debug,
	Clone,
	Copy,
	PartialEq,
	Eq,
	PartialOrd,
	Ord,
	Hash,
	Serialize,
	Deserialize,
	Display,
	AsRefStr,
	EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FileKind {
	Folder,
	Image,
	Document,
	Code,
	Audio,
	Video,
	Archive,
	// Anything we don't recognise
	File,
}

impl FileKind {
	#[must_use]
	pub fn from_name(name: &str) -> Self {
		extension_of(name).map_or(Self::File, |ext| Self::from_extension(&ext))
	}

	/// Classify a lowercase extension without its dot.
	#[must_use]
	pub fn from_extension(ext: &str) -> Self {
		match ext {
			"jpg" | "jpeg" | "png" | "gif" | "webp" | "bmp" | "tif" | "tiff" | "svg" | "svgz"
			| "ico" | "heic" | "heif" | "avif" => Self::Image,

			"pdf" | "doc" | "docx" | "odt" | "rtf" | "xls" | "xlsx" | "ods" | "csv" | "ppt"
			| "pptx" | "odp" | "txt" | "md" | "epub" => Self::Document,

			"rs" | "go" | "js" | "ts" | "jsx" | "tsx" | "py" | "rb" | "java" | "kt" | "c" | "h"
			| "cpp" | "hpp" | "cs" | "php" | "sh" | "html" | "css" | "scss" | "json" | "xml"
			| "yml" | "yaml" | "toml" | "sql" | "swift" => Self::Code,

			"mp3" | "wav" | "flac" | "ogg" | "oga" | "m4a" | "aac" | "opus" | "wma" => Self::Audio,

			"mp4" | "mkv" | "webm" | "avi" | "mov" | "wmv" | "flv" | "m4v" | "mpg" | "mpeg"
			| "3gp" | "ogv" => Self::Video,

			"zip" | "tar" | "gz" | "tgz" | "bz2" | "xz" | "7z" | "rar" | "zst" => Self::Archive,

			_ => Self::File,
		}
	}
}

pub(super) fn extension_of(name: &str) -> Option<String> {
	Path::new(name)
		.extension()
		.and_then(|ext| ext.to_str())
		.filter(|ext| !ext.is_empty())
		.map(str::to_ascii_lowercase)
}
