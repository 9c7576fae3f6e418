use super::{Dimension, Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewRequest {
	file_id: String,
	width: u32,
	height: u32,
}

impl PreviewRequest {
	pub fn new(file_id: impl Into<String>, width: u32, height: u32) -> Result<Self> {
		if width == 0 {
			return Err(Error::InvalidParameter(Dimension::Width));
		}
		if height == 0 {
			return Err(Error::InvalidParameter(Dimension::Height));
		}

		Ok(Self {
			file_id: file_id.into(),
			width,
			height,
		})
	}

	#[must_use]
	pub fn file_id(&self) -> &str {
		&self.file_id
	}

	#[must_use]
	pub const fn width(&self) -> u32 {
		self.width
	}

	#[must_use]
	pub const fn height(&self) -> u32 {
		self.height
	}

	/// Build a request from raw query values. Width is checked first.
	pub fn parse(file_id: impl Into<String>, width: &str, height: &str) -> Result<Self> {
		let width = parse_dimension(width, Dimension::Width)?;
		let height = parse_dimension(height, Dimension::Height)?;

		Self::new(file_id, width, height)
	}
}

fn parse_dimension(value: &str, dimension: Dimension) -> Result<u32> {
	value
		.parse::<u32>()
		.ok()
		.filter(|value| *value > 0)
		.ok_or(Error::InvalidParameter(dimension))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_positive_integers() {
		let request = PreviewRequest::parse("/a.png", "0100", "75").unwrap();
		assert_eq!((request.width(), request.height()), (100, 75));
		assert_eq!(request.file_id(), "/a.png");
	}

	#[test]
	fn zero_sized_box_is_rejected() {
		assert!(matches!(
			PreviewRequest::new("/a.png", 0, 100),
			Err(Error::InvalidParameter(Dimension::Width))
		));
		assert!(matches!(
			PreviewRequest::new("/a.png", 100, 0),
			Err(Error::InvalidParameter(Dimension::Height))
		));
	}

	#[test]
	fn rejects_bad_dimensions() {
		for (width, height, expected) in [
			("abc", "10", "incorrect width value"),
			("", "10", "incorrect width value"),
			("-5", "10", "incorrect width value"),
			("0", "10", "incorrect width value"),
			("10", "1.5", "incorrect height value"),
			("10", "0", "incorrect height value"),
			("abc", "def", "incorrect width value"),
		] {
			let err = PreviewRequest::parse("/a.png", width, height).unwrap_err();
			assert_eq!(err.to_string(), expected, "{width}x{height}");
		}
	}
}
