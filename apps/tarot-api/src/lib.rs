pub mod routes;
pub mod state;

use std::{net::SocketAddr, path::PathBuf};

use axum::http::{HeaderValue, Method};
use clap::Parser;
use color_eyre::eyre;
use tokio::net::TcpListener;
use tower_http::{
	cors::{AllowOrigin, Any, CorsLayer},
	trace::TraceLayer,
};
use tracing_subscriber::EnvFilter;

use crate::state::AppState;

#[derive(Debug, Parser)]
#[command(
	version = tarot_cli::VERSION,
	rename_all = "kebab",
	styles = tarot_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = tarot_config::load(&args.config)?;

	init_tracing(&config)?;

	if tarot_domain::persona::find(&config.reading.default_persona).is_none() {
		return Err(eyre::eyre!(
			"reading.default_persona must be one of: {}.",
			tarot_domain::persona::keys().join(", ")
		));
	}

	let http_addr: SocketAddr = config.service.http_bind.parse()?;
	let cors = cors_layer(&config.service.cors_allowed_origins)?;
	let state = AppState::new(config).await?;
	let app = routes::router(state).layer(cors).layer(TraceLayer::new_for_http());
	let listener = TcpListener::bind(http_addr).await?;

	tracing::info!(%http_addr, "HTTP server listening.");

	axum::serve(listener, app).await?;

	Ok(())
}

/// Allows the configured frontend origins. No origins means no cross-origin access.
pub fn cors_layer(origins: &[String]) -> color_eyre::Result<CorsLayer> {
	let origins = origins
		.iter()
		.map(|origin| origin.parse::<HeaderValue>())
		.collect::<Result<Vec<_>, _>>()?;

	Ok(CorsLayer::new()
		.allow_origin(AllowOrigin::list(origins))
		.allow_methods([Method::GET, Method::POST, Method::OPTIONS])
		.allow_headers(Any))
}

fn init_tracing(config: &tarot_config::Config) -> color_eyre::Result<()> {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).try_init().map_err(|err| {
		eyre::eyre!("Failed to install the tracing subscriber: {err}")
	})?;

	Ok(())
}
