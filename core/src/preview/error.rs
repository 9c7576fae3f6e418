use crate::drive::{self, FileKind};

use fm_utils::error::FileIOError;

use strum::Display;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Dimension {
	Width,
	Height,
}

/// Failures reported to whoever asked for a preview. The messages are what http
/// clients get to see.
#[derive(thiserror::Error, Debug)]
pub enum Error {
	#[error("incorrect {0} value")]
	InvalidParameter(Dimension),
	#[error("Access denied")]
	AccessDenied(#[source] drive::Error),
	#[error("Previews not configured")]
	PreviewsDisabled,
}

/// Why no preview could be rendered. Only ever logged, the caller gets an icon.
#[derive(thiserror::Error, Debug)]
pub enum RenderError {
	#[error("thumbnailer failed: {0}")]
	Thumbnail(#[from] fm_images::Error),
	#[error("render service failed: {0}")]
	RenderService(#[from] fm_render_proxy::Error),
	#[error("no renderer for '{0}' files")]
	Unsupported(FileKind),
	#[error(transparent)]
	CacheFolder(FileIOError),
}
