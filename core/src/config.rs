//! Preview settings, built once at startup and handed to the
//! [`PreviewManager`](crate::preview::PreviewManager).

use std::{fmt, path::PathBuf, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};
use url::Url;

/// Literal endpoint value that turns previews off entirely.
pub const DISABLED_ENDPOINT: &str = "none";

pub const DEFAULT_MAX_DIMENSION: u32 = 2000;
pub const DEFAULT_MAX_SOURCE_SIZE: u64 = 50 * 1000 * 1000;
pub const DEFAULT_ICON_SIZE: &str = "big";

/// Where previews come from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RenderEndpoint {
	/// Images are thumbnailed in process, everything else gets an icon.
	#[default]
	Local,
	/// No previews at all, every request is refused.
	Disabled,
	/// Every file type is sent to the render service at this url.
	Remote(Url),
}

impl FromStr for RenderEndpoint {
	type Err = url::ParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim() {
			"" => Ok(Self::Local),
			DISABLED_ENDPOINT => Ok(Self::Disabled),
			url => Url::parse(url).map(Self::Remote),
		}
	}
}

impl TryFrom<String> for RenderEndpoint {
	type Error = url::ParseError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		value.parse()
	}
}

impl From<RenderEndpoint> for String {
	fn from(endpoint: RenderEndpoint) -> Self {
		endpoint.to_string()
	}
}

impl fmt::Display for RenderEndpoint {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Local => Ok(()),
			Self::Disabled => f.write_str(DISABLED_ENDPOINT),
			Self::Remote(url) => write!(f, "{url}"),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
	/// `none`, empty for local thumbnails, or the render service url.
	#[serde(rename = "endpoint")]
	pub render_endpoint: RenderEndpoint,

	/// Requests asking for a larger box get an icon.
	pub max_dimension: u32,

	/// Sources larger than this many bytes get an icon.
	pub max_source_size: u64,

	/// Whole-request limit for the render service, upload and download included.
	#[serde(with = "seconds")]
	pub render_timeout: Duration,

	pub icons_dir: PathBuf,

	/// Size tier used for fallback icons.
	pub icon_size: String,
}

impl Default for PreviewConfig {
	fn default() -> Self {
		Self {
			render_endpoint: RenderEndpoint::default(),
			max_dimension: DEFAULT_MAX_DIMENSION,
			max_source_size: DEFAULT_MAX_SOURCE_SIZE,
			render_timeout: fm_render_proxy::DEFAULT_TIMEOUT,
			icons_dir: PathBuf::from("icons"),
			icon_size: DEFAULT_ICON_SIZE.to_string(),
		}
	}
}

impl PreviewConfig {
	#[must_use]
	pub fn with_endpoint(mut self, render_endpoint: RenderEndpoint) -> Self {
		self.render_endpoint = render_endpoint;
		self
	}

	#[must_use]
	pub fn with_icons_dir(mut self, icons_dir: impl Into<PathBuf>) -> Self {
		self.icons_dir = icons_dir.into();
		self
	}
}

mod seconds {
	use std::time::Duration;

	use serde::{Deserialize, Deserializer, Serializer};

	pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_u64(value.as_secs())
	}

	pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
		u64::deserialize(deserializer).map(Duration::from_secs)
	}
}
