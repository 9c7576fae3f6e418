use std::{fmt::Display, path::Path};

use thiserror::Error;
use tracing::error;

/// Report an error with tracing
pub fn report_error(res: &Result<(), impl Display>) {
	if let Err(e) = res {
		error!("{e:#}");
	}
}

/// File I/O error that includes the path that caused the error
#[derive(Error, Debug)]
pub struct FileIOError {
	pub path: Box<Path>,
	#[source]
	pub source: std::io::Error,
	pub maybe_context: Option<String>,
}

impl Display for FileIOError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"file I/O error{}: {}; path: '{}'",
			self.maybe_context
				.as_ref()
				.map(|ctx| format!(" ({ctx})"))
				.unwrap_or_default(),
			self.source,
			self.path.display()
		)
	}
}

impl<P: AsRef<Path>> From<(P, std::io::Error)> for FileIOError {
	fn from((path, source): (P, std::io::Error)) -> Self {
		Self::from_std_io_err(path, source)
	}
}

impl<P: AsRef<Path>> From<(P, std::io::Error, &'static str)> for FileIOError {
	fn from((path, source, msg): (P, std::io::Error, &'static str)) -> Self {
		Self::from_std_io_err_with_msg(path, source, msg)
	}
}

impl FileIOError {
	pub fn from_std_io_err(path: impl AsRef<Path>, source: std::io::Error) -> Self {
		Self {
			path: path.as_ref().into(),
			source,
			maybe_context: None,
		}
	}

	pub fn from_std_io_err_with_msg(
		path: impl AsRef<Path>,
		source: std::io::Error,
		msg: impl Into<String>,
	) -> Self {
		Self {
			path: path.as_ref().into(),
			source,
			maybe_context: Some(msg.into()),
		}
	}
}
