//! SVGs have no pixel size of their own. They are rasterized at about
//! [`SVG_TARGET_PX`] pixels, keeping their aspect ratio, and then shrunk into the
//! requested box like any other image.

use crate::{
	consts::{SVG_MAXIMUM_FILE_SIZE, SVG_TARGET_PX},
	scale_dimensions, Error, ImageHandler, Result,
};

use std::{path::Path, sync::Arc};

use image::{DynamicImage, RgbaImage};
use once_cell::sync::Lazy;
use resvg::{
	tiny_skia::{IntSize, Pixmap, Transform},
	usvg::{self, fontdb},
};
use tracing::trace;

// Loading system fonts is slow, do it once for every SVG we'll ever see
static FONTS: Lazy<Arc<fontdb::Database>> = Lazy::new(|| {
	let mut fonts = fontdb::Database::new();
	fonts.load_system_fonts();
	trace!(faces = fonts.len(), "Loaded system fonts for SVG text");
	Arc::new(fonts)
});

pub struct SvgHandler;

impl ImageHandler for SvgHandler {
	fn maximum_size(&self) -> u64 {
		SVG_MAXIMUM_FILE_SIZE
	}

	fn handle_image(&self, path: &Path) -> Result<DynamicImage> {
		let data = self.get_data(path)?;

		let options = usvg::Options {
			fontdb: Arc::clone(&FONTS),
			..Default::default()
		};

		rasterize(&usvg::Tree::from_data(&data, &options)?)
	}
}

fn raster_size(tree: &usvg::Tree) -> Result<IntSize> {
	let size = tree.size();
	let (w, h) = scale_dimensions(size.width(), size.height(), SVG_TARGET_PX);

	IntSize::from_wh(w.max(1), h.max(1)).ok_or(Error::InvalidLength)
}

#[allow(clippy::as_conversions, clippy::cast_precision_loss)]
fn rasterize(tree: &usvg::Tree) -> Result<DynamicImage> {
	let size = raster_size(tree)?;
	let mut pixmap = Pixmap::new(size.width(), size.height()).ok_or(Error::Pixbuf)?;

	let transform = Transform::from_scale(
		size.width() as f32 / tree.size().width(),
		size.height() as f32 / tree.size().height(),
	);
	resvg::render(tree, transform, &mut pixmap.as_mut());

	RgbaImage::from_raw(size.width(), size.height(), pixmap.take())
		.map(DynamicImage::ImageRgba8)
		.ok_or(Error::RgbImageConversion)
}
