#![warn(
	clippy::all,
	clippy::pedantic,
	clippy::correctness,
	clippy::perf,
	clippy::style,
	clippy::suspicious,
	clippy::complexity,
	clippy::nursery,
	clippy::unwrap_used,
	unused_qualifications,
	rust_2018_idioms,
	clippy::expect_used,
	trivial_casts,
	trivial_numeric_casts,
	unused_allocation,
	clippy::as_conversions,
	clippy::dbg_macro
)]
#![forbid(unsafe_code)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

mod consts;
mod error;
mod generic;
mod handler;
mod svg;
mod thumbnail;

pub use consts::{JPEG_EXTENSION, SVG_EXTENSIONS, TARGET_QUALITY};
pub use error::{Error, Result};
pub use handler::format_image;
pub use image::DynamicImage;
pub use thumbnail::{encode_thumbnail, render, thumbnail_dimensions};

use std::{fs, io::Read, path::Path};

use fm_utils::error::FileIOError;

pub trait ImageHandler {
	fn maximum_size(&self) -> u64;

	fn get_data(&self, path: &Path) -> Result<Vec<u8>> {
		let mut file = fs::File::open(path).map_err(|e| Error::Read((path, e).into()))?;
		let len = file
			.metadata()
			.map_err(|e| Error::Read((path, e).into()))?
			.len();

		if len > self.maximum_size() {
			Err(Error::TooLarge)
		} else {
			let mut data = vec![];
			file.read_to_end(&mut data)
				.map_err(|e| Error::Read(FileIOError::from((path, e))))?;
			Ok(data)
		}
	}

	fn handle_image(&self, path: &Path) -> Result<DynamicImage>;
}

/// This takes in a width and a height, and returns a scaled width and height
/// It is scaled proportionally to the `target_px`, so smaller images will be upscaled,
/// and larger images will be downscaled. This approach also maintains the aspect ratio of the image.
#[allow(
	clippy::as_conversions,
	clippy::cast_precision_loss,
	clippy::cast_possible_truncation,
	clippy::cast_sign_loss
)]
#[must_use]
pub fn scale_dimensions(w: f32, h: f32, target_px: f32) -> (u32, u32) {
	let sf = (target_px / (w * h)).sqrt();
	((w * sf).round() as u32, (h * sf).round() as u32)
}
