use tokio::io::{BufReader, stdin, stdout};
use tracing::{error, info};

use smarthouse_gateway::config::SerialConfig;
use smarthouse_gateway::device::DeviceLink;
use smarthouse_gateway::probe::run_probe;
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

    let link = match DeviceLink::open(&serial).await {
        Ok(link) => link,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let sent = run_probe(&link, BufReader::new(stdin()), stdout(), shutdown_token()).await;
    info!("Probe finished, {} line(s) sent", sent);

    // The blocking stdin reader may still hold a runtime thread.
    std::process::exit(0);
}
