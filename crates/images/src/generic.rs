use crate::{consts::GENERIC_MAXIMUM_FILE_SIZE, Error, ImageHandler, Result};

use std::path::Path;

use image::DynamicImage;
use tracing::trace;

/// Every raster format the `image` crate is built with. The format is sniffed from
/// the content, so a misnamed file still decodes.
pub struct GenericHandler;

impl ImageHandler for GenericHandler {
	fn maximum_size(&self) -> u64 {
		GENERIC_MAXIMUM_FILE_SIZE
	}

	fn handle_image(&self, path: &Path) -> Result<DynamicImage> {
		let data = self.get_data(path)?;
		let format = image::guess_format(&data).map_err(Error::Decode)?;

		trace!(?format, "Decoding raster image");

		image::load_from_memory_with_format(&data, format).map_err(Error::Decode)
	}
}
