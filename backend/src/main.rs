//! Backend entry-point: loads settings, wires the services and serves the REST API.

mod server;

use actix_web::web;
use color_eyre::eyre::{Context, Result, eyre};
use ortho_config::OrthoConfig;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use fieldcrew::inbound::http::health::HealthState;
use server::{ServerSettings, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load_from_iter(std::env::args_os())
        .map_err(|err| eyre!("failed to load server settings: {err}"))?;

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), &settings)
        .wrap_err("failed to start HTTP server")?;

    health_state.mark_ready();
    server.await.wrap_err("HTTP server stopped with an error")?;
    health_state.mark_unhealthy();
    Ok(())
}
