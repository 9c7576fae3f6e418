//! HTTP surface of the preview service.

pub mod config;
mod router;

pub use config::{AppConfig, Cli};
pub use router::router;
