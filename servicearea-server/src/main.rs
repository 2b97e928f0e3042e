mod config;
mod error;
mod routes;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use servicearea_core::{ServiceAreaComputer, load_node_link_graph};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;
use crate::state::AppState;

/// HTTP service computing walking service areas on a street network
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Address to listen on, overrides the configuration
    #[arg(long)]
    bind: Option<SocketAddr>,
    /// Street graph in node-link JSON, overrides the configuration
    #[arg(long)]
    graph: Option<PathBuf>,
    /// Service area radius, overrides the configuration
    #[arg(long)]
    radius: Option<f64>,
}

impl Args {
    fn resolve_config(&self) -> anyhow::Result<ServerConfig> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::load(path)?,
            None => ServerConfig::default(),
        };

        if let Some(bind) = self.bind {
            config.bind = bind;
        }
        if let Some(graph) = &self.graph {
            config.graph_path = Some(graph.clone());
        }
        if let Some(radius) = self.radius {
            config.service_area.radius = radius;
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = args.resolve_config()?;

    let graph_path = config
        .graph_path
        .clone()
        .context("no street graph configured, pass --graph or set graph_path")?;
    let graph = load_node_link_graph(&graph_path)?;
    let computer = ServiceAreaComputer::new(Arc::new(graph), config.service_area.clone())?;
    info!(
        "Service areas with radius {} ({})",
        computer.radius(),
        computer.crs()
    );

    let app = routes::router(Arc::new(AppState { computer }), &config);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    info!("Listening on {}", config.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
