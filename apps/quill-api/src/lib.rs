pub mod auth;
pub mod routes;
pub mod state;

use std::net::SocketAddr;

use clap::Parser;
use color_eyre::eyre;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use crate::state::AppState;

#[derive(Debug, Parser)]
#[command(
	version = quill_cli::VERSION,
	rename_all = "kebab",
	styles = quill_cli::styles(),
)]
pub struct Args {
	#[command(flatten)]
	pub config: quill_cli::ConfigArgs,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = quill_config::load(&args.config.config)?;

	init_tracing(&config);

	let (http_addr, admin_addr) = bind_addresses(&config)?;
	let state = AppState::new(config).await?;
	let http_listener = TcpListener::bind(http_addr).await?;
	let admin_listener = TcpListener::bind(admin_addr).await?;

	tracing::info!(%http_addr, %admin_addr, "Listening.");

	tokio::try_join!(
		axum::serve(http_listener, routes::router(state.clone())),
		axum::serve(admin_listener, routes::admin_router(state)),
	)?;

	Ok(())
}

/// Resolves both listener addresses. The admin listener is loopback-only, and so is the user
/// listener unless `security.bind_localhost_only` is off.
fn bind_addresses(config: &quill_config::Config) -> color_eyre::Result<(SocketAddr, SocketAddr)> {
	let http_addr: SocketAddr = config.service.http_bind.parse()?;
	let admin_addr: SocketAddr = config.service.admin_bind.parse()?;

	if config.security.bind_localhost_only && !http_addr.ip().is_loopback() {
		eyre::bail!(
			"service.http_bind must be a loopback address when security.bind_localhost_only is true."
		);
	}
	if !admin_addr.ip().is_loopback() {
		eyre::bail!("service.admin_bind must be a loopback address.");
	}

	Ok((http_addr, admin_addr))
}

fn init_tracing(config: &quill_config::Config) {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).init();
}
