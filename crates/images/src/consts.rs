pub const SVG_EXTENSIONS: [&str; 2] = ["svg", "svgz"];

/// Extension of every locally generated thumbnail.
pub const JPEG_EXTENSION: &str = ".jpg";

/// JPEG quality of generated thumbnails, from 1 to 100.
pub const TARGET_QUALITY: u8 = 85;

/// Pixel count SVGs are rasterized at before being resized into the requested box.
pub const SVG_TARGET_PX: f32 = 1_048_576.0; // 1024x1024

/// The maximum file size that an image can be in order to have a thumbnail generated.
///
/// This value is in MiB.
pub(crate) const SVG_MAXIMUM_FILE_SIZE: u64 = MIB * 24;

/// The maximum file size that an image can be in order to have a thumbnail generated.
///
/// This value is in MiB.
pub(crate) const GENERIC_MAXIMUM_FILE_SIZE: u64 = MIB * 64;

/// The size of 1MiB in bytes
const MIB: u64 = 1_048_576;
