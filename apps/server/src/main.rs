use fm_core::{LocalDrive, PreviewManager};
use fm_server::{router, AppConfig, Cli};

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::{net::TcpListener, signal};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let config = AppConfig::load(Cli::parse())?;

	let filter =
		EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.log_level))?;

	tracing_subscriber::registry()
		.with(filter)
		.with(fmt::layer())
		.init();

	info!(
		root = %config.root.display(),
		icons = %config.preview.icons_dir.display(),
		endpoint = %config.preview.render_endpoint,
		"Starting preview server"
	);

	let drive = Arc::new(LocalDrive::new(&config.root));
	let previews = Arc::new(
		PreviewManager::new(&config.preview, drive).context("Failed to set up previews")?,
	);

	let addr = config.listen_addr();
	let listener = TcpListener::bind(&addr)
		.await
		.with_context(|| format!("Failed to listen on {addr}"))?;

	info!("Listening on http://{}", listener.local_addr()?);

	axum::serve(listener, router(previews))
		.with_graceful_shutdown(shutdown_signal())
		.await
		.context("HTTP server error")?;

	info!("Server stopped");

	Ok(())
}

async fn shutdown_signal() {
	if let Err(e) = signal::ctrl_c().await {
		error!(?e, "Failed to listen for Ctrl-C, running until killed");
		std::future::pending::<()>().await;
	}

	info!("Shutting down");
}
