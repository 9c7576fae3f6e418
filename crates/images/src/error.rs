use fm_utils::error::FileIOError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
	#[error("error with usvg: {0}")]
	USvg(#[from] resvg::usvg::Error),
	#[error("failed to allocate `Pixmap` while converting an SVG")]
	Pixbuf,
	#[error("error while decoding the image (via the `image` crate): {0}")]
	Decode(#[source] image::ImageError),
	#[error("error while encoding the thumbnail (via the `image` crate): {0}")]
	Encode(#[source] image::ImageError),
	#[error("failed to read the source image: {0}")]
	Read(#[source] FileIOError),
	#[error("failed to write the thumbnail: {0}")]
	Write(#[source] FileIOError),
	#[error("there was an error while converting the image to an `RgbaImage`")]
	RgbImageConversion,
	#[error("the image provided is too large")]
	TooLarge,
	#[error("the image has an invalid length to be RGB")]
	InvalidLength,
	#[error("a thumbnail box must be at least 1x1, got {0}x{1}")]
	InvalidDimensions(u32, u32),
	#[error("panic while generating the thumbnail: {0}")]
	Panic(String),
}

impl Error {
	/// Whether the source could not be understood as an image, as opposed to a failure
	/// on our side while producing the thumbnail.
	#[must_use]
	pub const fn is_decode(&self) -> bool {
		matches!(
			self,
			Self::Decode(_)
				| Self::USvg(_)
				| Self::Read(_)
				| Self::TooLarge
				| Self::InvalidLength
				| Self::RgbImageConversion
		)
	}
}
