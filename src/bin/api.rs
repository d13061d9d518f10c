use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info};

use smarthouse_gateway::api;
use smarthouse_gateway::config::{ApiConfig, SerialConfig};
use smarthouse_gateway::device::DeviceLink;
use smarthouse_gateway::shutdown::shutdown_token;

#[tokio::main]
async fn main() {
    smarthouse_gateway::init_tracing();

    let serial = match SerialConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let api_config = match ApiConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let link = match DeviceLink::open(&serial).await {
        Ok(link) => Arc::new(link),
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let address = SocketAddr::from((api_config.host, api_config.port));
    let listener = match TcpListener::bind(address).await {
        Ok(l) => l,
        Err(e) => {
            error!("Failed to bind {}: {}", address, e);
            std::process::exit(1);
        }
    };

    info!("Command API listening on {}", address);

    let cancel = shutdown_token();
    if let Err(e) = axum::serve(listener, api::router(link))
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await
    {
        error!("Server error: {}", e);
        std::process::exit(1);
    }

    info!("Command API stopped");
}
