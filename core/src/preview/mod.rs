//! Turns a preview request into a file to serve: a cached preview, a freshly
//! rendered one or a fallback icon.

use crate::{
	config::{PreviewConfig, RenderEndpoint},
	drive::{Drive, FileInfo, FileKind},
};

use fm_icons::IconResolver;
use fm_render_proxy::RenderProxy;
use fm_utils::error::report_error;

use std::{
	collections::BTreeMap,
	ffi::OsStr,
	path::{Path, PathBuf},
	sync::Arc,
};

use tracing::{debug, instrument, trace, warn};

mod cache;
mod error;
mod locks;
mod request;

pub use cache::{CacheEntry, CacheKey, KEY_SEPARATOR, PREVIEW_DIR_NAME, PREVIEW_EXTENSIONS};
pub use error::{Dimension, Error, RenderError, Result};
pub use request::PreviewRequest;

use locks::KeyLocks;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preview {
	/// Found in the cache.
	Cached(PathBuf),
	/// Rendered while handling this request.
	Generated(PathBuf),
	/// No real preview, serve the file type icon instead.
	Icon { path: PathBuf, reason: IconReason },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconReason {
	/// The source or the requested box exceed the configured limits.
	TooLarge,
	/// Folders have no content to render.
	Folder,
	/// An earlier render of the same key failed.
	KnownFailure,
	/// Rendering failed just now.
	RenderFailed,
}

impl Preview {
	#[must_use]
	pub fn path(&self) -> &Path {
		match self {
			Self::Cached(path) | Self::Generated(path) | Self::Icon { path, .. } => path,
		}
	}

	#[must_use]
	pub const fn is_icon(&self) -> bool {
		matches!(self, Self::Icon { .. })
	}
}

#[derive(Debug)]
enum Renderer {
	Thumbnailer,
	RenderService(RenderProxy),
}

pub struct PreviewManager {
	config: PreviewConfig,
	drive: Arc<dyn Drive>,
	icons: IconResolver,
	renderer: Option<Renderer>,
	locks: KeyLocks,
}

impl PreviewManager {
	pub fn new(config: &PreviewConfig, drive: Arc<dyn Drive>) -> fm_render_proxy::Result<Self> {
		let renderer = match &config.render_endpoint {
			RenderEndpoint::Local => Some(Renderer::Thumbnailer),
			RenderEndpoint::Disabled => None,
			RenderEndpoint::Remote(url) => Some(Renderer::RenderService(RenderProxy::new(
				url.clone(),
				config.render_timeout,
			)?)),
		};

		debug!(endpoint = ?config.render_endpoint, "Preview manager ready");

		Ok(Self {
			icons: IconResolver::new(&config.icons_dir),
			config: config.clone(),
			drive,
			renderer,
			locks: KeyLocks::default(),
		})
	}

	#[must_use]
	pub const fn config(&self) -> &PreviewConfig {
		&self.config
	}

	#[must_use]
	pub const fn icons(&self) -> &IconResolver {
		&self.icons
	}

	#[must_use]
	pub const fn is_enabled(&self) -> bool {
		self.renderer.is_some()
	}

	/// File types that can get a real preview with the current renderer.
	#[must_use]
	pub fn features(&self) -> BTreeMap<FileKind, bool> {
		let kinds: &[FileKind] = match self.renderer {
			None => &[],
			Some(Renderer::Thumbnailer) => &[FileKind::Image],
			Some(Renderer::RenderService(_)) => {
				&[FileKind::Image, FileKind::Document, FileKind::Code]
			}
		};

		kinds.iter().map(|kind| (*kind, true)).collect()
	}

	/// Find or make the preview for `request`.
	///
	/// Only bad requests and files the drive won't give us are errors. Anything going
	/// wrong while rendering ends up as an icon, and is remembered so the same key is
	/// never rendered twice.
	#[instrument(
		skip_all,
		fields(file_id = %request.file_id(), width = request.width(), height = request.height())
	)]
	pub async fn get_preview(&self, request: &PreviewRequest) -> Result<Preview> {
		let Some(renderer) = &self.renderer else {
			return Err(Error::PreviewsDisabled);
		};

		let info = self
			.drive
			.info(request.file_id())
			.await
			.map_err(Error::AccessDenied)?;

		if info.size > self.config.max_source_size
			|| request.width() > self.config.max_dimension
			|| request.height() > self.config.max_dimension
		{
			debug!(size = info.size, "Preview request over limits, serving icon");
			return Ok(self.icon(&info, IconReason::TooLarge));
		}

		if info.kind == FileKind::Folder {
			return Ok(self.icon(&info, IconReason::Folder));
		}

		let source = self
			.drive
			.resolve(request.file_id())
			.map_err(Error::AccessDenied)?;

		let Some(key) = CacheKey::new(&source, request.width(), request.height()) else {
			return Ok(self.icon(&info, IconReason::Folder));
		};

		if let Some(entry) = key.probe().await {
			return Ok(self.from_entry(entry, &info));
		}

		let lock = self.locks.get(key.base());
		let _guard = lock.lock().await;

		// Whoever held the lock before us may have rendered it already
		if let Some(entry) = key.probe().await {
			return Ok(self.from_entry(entry, &info));
		}

		let rendered = match key.create_folder().await {
			Ok(()) => self.render(renderer, request, &info, &source, &key).await?,
			Err(e) => Err(RenderError::CacheFolder(e)),
		};

		match rendered {
			Ok(ext) => {
				let path = key.path_with(ext);
				debug!(path = %path.display(), "Generated preview");
				Ok(Preview::Generated(path))
			}
			Err(e) => {
				warn!(%key, error = %e, "Failed to generate preview, caching the failure");
				report_error(&key.write_placeholder().await);
				Ok(self.icon(&info, IconReason::RenderFailed))
			}
		}
	}

	/// Run the configured renderer. The outer error is the drive refusing to hand
	/// over the source, the inner one a failed render.
	async fn render(
		&self,
		renderer: &Renderer,
		request: &PreviewRequest,
		info: &FileInfo,
		source: &Path,
		key: &CacheKey,
	) -> Result<std::result::Result<&'static str, RenderError>> {
		let (width, height) = (request.width(), request.height());

		Ok(match renderer {
			Renderer::RenderService(proxy) => {
				let reader = self
					.drive
					.read(request.file_id())
					.await
					.map_err(Error::AccessDenied)?;

				proxy
					.render(reader, key.base(), key.file_name(), width, height)
					.await
					.map_err(RenderError::from)
			}
			Renderer::Thumbnailer if info.kind == FileKind::Image => {
				fm_images::render(source, width, height, key.base())
					.await
					.map_err(RenderError::from)
			}
			Renderer::Thumbnailer => Err(RenderError::Unsupported(info.kind)),
		})
	}

	fn from_entry(&self, entry: CacheEntry, info: &FileInfo) -> Preview {
		match entry {
			CacheEntry::Positive(path) => {
				trace!(path = %path.display(), "Preview cache hit");
				Preview::Cached(path)
			}
			CacheEntry::Negative => self.icon(info, IconReason::KnownFailure),
		}
	}

	fn icon(&self, info: &FileInfo, reason: IconReason) -> Preview {
		// Icon names keep the extension's case, `REPORT.PDF` looks for `PDF.svg`
		let name = match Path::new(&info.name).extension().and_then(OsStr::to_str) {
			Some(ext) if !ext.is_empty() => format!("{ext}.svg"),
			_ => format!("{}.svg", info.kind),
		};

		Preview::Icon {
			path: self
				.icons
				.resolve(&self.config.icon_size, info.kind.as_ref(), &name),
			reason,
		}
	}
}
