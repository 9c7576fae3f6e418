use crate::{consts, generic::GenericHandler, svg::SvgHandler, ImageHandler, Result};
use image::DynamicImage;
use std::{ffi::OsString, path::Path};

/// Decode the image at `path`, picking the handler from its extension.
pub fn format_image(path: impl AsRef<Path>) -> Result<DynamicImage> {
	match_to_handler(path.as_ref()).handle_image(path.as_ref())
}

fn match_to_handler(path: &Path) -> Box<dyn ImageHandler> {
	let Some(ext) = path.extension().map(|e| e.to_ascii_lowercase()) else {
		// The generic handler sniffs the format from the content anyway
		return Box::new(GenericHandler);
	};

	if consts::SVG_EXTENSIONS
		.iter()
		.map(OsString::from)
		.any(|x| x == ext)
	{
		Box::new(SvgHandler)
	} else {
		Box::new(GenericHandler)
	}
}
