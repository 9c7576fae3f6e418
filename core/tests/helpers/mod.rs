//! Shared fixtures for the preview integration tests

pub mod render_service;

pub use render_service::*;

use fm_core::{LocalDrive, PreviewConfig, PreviewManager, RenderEndpoint};

use std::{path::PathBuf, sync::Arc};

use image::{ImageBuffer, ImageFormat, Rgb};
use tempfile::TempDir;

pub const ICON_TYPES: [&str; 4] = ["image", "document", "folder", "file"];

/// A drive root and an icons folder, both temporary.
pub struct Fixture {
	pub root: TempDir,
	pub icons: TempDir,
}

impl Fixture {
	pub fn new() -> Self {
		let icons = TempDir::new().unwrap();
		let types = icons.path().join("big").join("types");
		std::fs::create_dir_all(&types).unwrap();
		for kind in ICON_TYPES {
			std::fs::write(types.join(format!("{kind}.svg")), "<svg/>").unwrap();
		}

		Self {
			root: TempDir::new().unwrap(),
			icons,
		}
	}

	pub fn path(&self, id: &str) -> PathBuf {
		self.root.path().join(id.trim_start_matches('/'))
	}

	pub fn icon(&self, kind: &str) -> PathBuf {
		self.icons
			.path()
			.join("big")
			.join("types")
			.join(format!("{kind}.svg"))
	}

	pub fn write(&self, id: &str, content: &[u8]) {
		let path = self.path(id);
		std::fs::create_dir_all(path.parent().unwrap()).unwrap();
		std::fs::write(path, content).unwrap();
	}

	pub fn write_png(&self, id: &str, width: u32, height: u32) {
		let path = self.path(id);
		std::fs::create_dir_all(path.parent().unwrap()).unwrap();
		ImageBuffer::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 90]))
			.save_with_format(path, ImageFormat::Png)
			.unwrap();
	}

	pub fn config(&self, endpoint: RenderEndpoint) -> PreviewConfig {
		PreviewConfig::default()
			.with_endpoint(endpoint)
			.with_icons_dir(self.icons.path())
	}

	pub fn manager(&self, endpoint: RenderEndpoint) -> PreviewManager {
		self.manager_with(&self.config(endpoint))
	}

	pub fn manager_with(&self, config: &PreviewConfig) -> PreviewManager {
		PreviewManager::new(config, Arc::new(LocalDrive::new(self.root.path()))).unwrap()
	}

	/// Every file below the root's `.preview` folders.
	pub fn cache_entries(&self, folder: &str) -> Vec<String> {
		let Ok(entries) = std::fs::read_dir(self.path(folder).join(".preview")) else {
			return Vec::new();
		};

		let mut names = entries
			.map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
			.collect::<Vec<_>>();
		names.sort();
		names
	}
}
