//! Server settings: an optional TOML file, overridden by command line flags and
//! `APP_*` environment variables.

use fm_core::{PreviewConfig, RenderEndpoint};

use std::{
	fs,
	path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tracing::info;

pub const DEFAULT_CONFIG_FILE: &str = "config.toml";
pub const DEFAULT_PORT: &str = ":3200";
pub const DEFAULT_LOG_LEVEL: &str = "info,fm_core=debug";

#[derive(Debug, Default, Parser)]
#[command(name = "fm-server", version, about = "Serves file previews and icons")]
pub struct Cli {
	/// TOML config file, `config.toml` is used if present
	#[arg(long, env = "APP_CONFIG")]
	pub config: Option<PathBuf>,

	/// Render service url, `none` to turn previews off
	#[arg(long, env = "APP_PREVIEW")]
	pub preview: Option<String>,

	/// Address to listen on, `:3200` listens on every interface
	#[arg(long, env = "APP_PORT")]
	pub port: Option<String>,

	/// Folder served as the drive
	#[arg(long, env = "APP_ROOT")]
	pub root: Option<PathBuf>,

	/// Folder holding the fallback icons
	#[arg(long, env = "APP_ICONS")]
	pub icons: Option<PathBuf>,

	/// Tracing filter directives, `RUST_LOG` wins if set
	#[arg(long, env = "APP_LOG_LEVEL")]
	pub log_level: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
	pub port: String,
	pub root: PathBuf,
	pub log_level: String,
	pub preview: PreviewConfig,
}

impl Default for AppConfig {
	fn default() -> Self {
		Self {
			port: DEFAULT_PORT.to_string(),
			root: PathBuf::from("."),
			log_level: DEFAULT_LOG_LEVEL.to_string(),
			preview: PreviewConfig::default(),
		}
	}
}

impl AppConfig {
	/// Build the config for a run of the server from its command line.
	pub fn load(cli: Cli) -> Result<Self> {
		let mut config = match &cli.config {
			Some(path) => Self::load_from(path)?,
			None if Path::new(DEFAULT_CONFIG_FILE).is_file() => Self::load_from(DEFAULT_CONFIG_FILE)?,
			None => Self::default(),
		};

		config.apply(cli)?;

		Ok(config)
	}

	pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let text = fs::read_to_string(path)
			.with_context(|| format!("Failed to read config file {}", path.display()))?;

		let config = toml::from_str(&text)
			.with_context(|| format!("Failed to parse config file {}", path.display()))?;

		info!(path = %path.display(), "Loaded config file");

		Ok(config)
	}

	fn apply(&mut self, cli: Cli) -> Result<()> {
		if let Some(preview) = cli.preview {
			self.preview.render_endpoint = preview
				.parse::<RenderEndpoint>()
				.with_context(|| format!("Invalid preview service url '{preview}'"))?;
		}
		if let Some(port) = cli.port {
			self.port = port;
		}
		if let Some(root) = cli.root {
			self.root = root;
		}
		if let Some(icons) = cli.icons {
			self.preview.icons_dir = icons;
		}
		if let Some(log_level) = cli.log_level {
			self.log_level = log_level;
		}

		Ok(())
	}

	/// `host:port` to bind. A bare `:port` or `port` means every interface.
	#[must_use]
	pub fn listen_addr(&self) -> String {
		let port = self.port.trim();

		match port.strip_prefix(':') {
			Some(port) => format!("0.0.0.0:{port}"),
			None if port.chars().all(|c| c.is_ascii_digit()) => format!("0.0.0.0:{port}"),
			None => port.to_string(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	use tempfile::TempDir;

	#[test]
	fn flags_override_the_file() {
		let dir = TempDir::new().unwrap();
		let path = dir.path().join("config.toml");
		fs::write(
			&path,
			"root = \"/srv/files\"\nport = \":8080\"\n\n[preview]\nendpoint = \"http://render:3000/\"\nmax_dimension = 1000\n",
		)
		.unwrap();

		let config = AppConfig::load(Cli {
			config: Some(path),
			preview: Some("none".to_string()),
			icons: Some(PathBuf::from("/srv/icons")),
			..Cli::default()
		})
		.unwrap();

		assert_eq!(config.root, PathBuf::from("/srv/files"));
		assert_eq!(config.listen_addr(), "0.0.0.0:8080");
		assert_eq!(config.preview.render_endpoint, RenderEndpoint::Disabled);
		assert_eq!(config.preview.max_dimension, 1000);
		assert_eq!(config.preview.icons_dir, PathBuf::from("/srv/icons"));
		assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
	}

	#[test]
	fn bad_preview_url_is_rejected() {
		assert!(AppConfig::load(Cli {
			config: Some(PathBuf::from("/definitely/not/here.toml")),
			..Cli::default()
		})
		.is_err());

		let mut config = AppConfig::default();
		assert!(config
			.apply(Cli {
				preview: Some("::not a url::".to_string()),
				..Cli::default()
			})
			.is_err());
	}

	#[test]
	fn listen_addresses() {
		let with_port = |port: &str| AppConfig {
			port: port.to_string(),
			..AppConfig::default()
		};

		assert_eq!(AppConfig::default().listen_addr(), "0.0.0.0:3200");
		assert_eq!(with_port("9000").listen_addr(), "0.0.0.0:9000");
		assert_eq!(with_port("127.0.0.1:9000").listen_addr(), "127.0.0.1:9000");
	}
}
