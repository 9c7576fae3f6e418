use crate::{
	consts::{JPEG_EXTENSION, TARGET_QUALITY},
	format_image, Error, Result,
};

use fm_utils::{error::FileIOError, with_appended_extension};

use std::{
	panic,
	path::{Path, PathBuf},
};

use image::{codecs::jpeg::JpegEncoder, imageops::FilterType, DynamicImage, GenericImageView};
use tokio::{fs, sync::oneshot, task::spawn_blocking};
use tracing::{error, instrument, trace};

/// Size of a thumbnail of a `src_w`x`src_h` image that fits inside `max_w`x`max_h`.
///
/// The aspect ratio is kept and images already inside the box are left as they are.
#[allow(
	clippy::as_conversions,
	clippy::cast_precision_loss,
	clippy::cast_possible_truncation,
	clippy::cast_sign_loss
)]
#[must_use]
pub fn thumbnail_dimensions(src_w: u32, src_h: u32, max_w: u32, max_h: u32) -> (u32, u32) {
	if src_w <= max_w && src_h <= max_h {
		return (src_w, src_h);
	}

	let ratio = f64::min(
		f64::from(max_w) / f64::from(src_w),
		f64::from(max_h) / f64::from(src_h),
	);

	(
		((f64::from(src_w) * ratio).round() as u32).clamp(1, max_w),
		((f64::from(src_h) * ratio).round() as u32).clamp(1, max_h),
	)
}

/// Decode `source`, shrink it into the `width`x`height` box and encode it as JPEG.
pub fn encode_thumbnail(source: impl AsRef<Path>, width: u32, height: u32) -> Result<Vec<u8>> {
	let img = format_image(source)?;

	let (src_w, src_h) = img.dimensions();
	let (w, h) = thumbnail_dimensions(src_w, src_h, width, height);

	let img = if (w, h) == (src_w, src_h) {
		img
	} else {
		img.resize_exact(w, h, FilterType::Lanczos3)
	};

	trace!(w, h, "Resized image, encoding as JPEG");

	// JPEG has no alpha channel
	let img = DynamicImage::ImageRgb8(img.into_rgb8());

	let mut jpeg = Vec::new();
	img.write_with_encoder(JpegEncoder::new_with_quality(&mut jpeg, TARGET_QUALITY))
		.map_err(Error::Encode)?;

	Ok(jpeg)
}

/// Render a JPEG thumbnail of the image at `source_path` into `dest_base` + `.jpg`.
///
/// Returns the extension that was used, which is always `.jpg`.
#[instrument(
	skip_all,
	fields(
		source_path = %source_path.as_ref().display(),
		dest_base = %dest_base.as_ref().display(),
		width = width,
		height = height,
	)
)]
pub async fn render(
	source_path: impl AsRef<Path> + Send,
	width: u32,
	height: u32,
	dest_base: impl AsRef<Path> + Send,
) -> Result<&'static str> {
	if width == 0 || height == 0 {
		return Err(Error::InvalidDimensions(width, height));
	}

	let source_path = source_path.as_ref().to_path_buf();

	let (tx, rx) = oneshot::channel();

	// Using channel instead of waiting the JoinHandle as for some reason
	// the JoinHandle can take some extra time to complete
	let handle = spawn_blocking({
		let source_path = source_path.clone();

		move || {
			// Handling error on receiver side
			let _ = tx.send(
				panic::catch_unwind(|| encode_thumbnail(&source_path, width, height))
					.unwrap_or_else(|_| {
						Err(Error::Panic(format!(
							"image codec panicked on '{}'",
							source_path.display()
						)))
					}),
			);
		}
	});

	let jpeg = if let Ok(res) = rx.await {
		res?
	} else {
		error!("Failed to generate thumbnail");
		return Err(Error::Panic(
			handle
				.await
				.err()
				.map_or_else(|| "thumbnail task vanished".to_string(), |e| e.to_string()),
		));
	};

	trace!("Generated thumbnail bytes");

	let output_path: PathBuf = with_appended_extension(dest_base, JPEG_EXTENSION);

	fs::write(&output_path, &jpeg)
		.await
		.map_err(|e| Error::Write(FileIOError::from((&output_path, e))))?;

	trace!("Wrote thumbnail to disk");

	Ok(JPEG_EXTENSION)
}
