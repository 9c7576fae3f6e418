//! On-demand previews for files on a drive.
//!
//! [`PreviewManager`] answers a request for a `width`x`height` preview of a file with
//! the path of something to serve. Previews are rendered either in process for
//! images or by an external render service for any file type, cached next to their
//! source and replaced by a file type icon whenever no preview can be had.

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

pub mod config;
pub mod drive;
pub mod preview;

pub use config::{PreviewConfig, RenderEndpoint};
pub use drive::{Drive, FileInfo, FileKind, LocalDrive};
pub use preview::{IconReason, Preview, PreviewManager, PreviewRequest};
