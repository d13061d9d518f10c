use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{error, info};

use smarthouse_gateway::config::{SerialConfig, WatchConfig};
use smarthouse_gateway::device::DeviceLink;
use smarthouse_gateway::firestore::Snapshot;
use smarthouse_gateway::firestore::client::FirestoreClient;
use smarthouse_gateway::shutdown::shutdown_token;
use smarthouse_gateway::watcher::ChangeWatcher;

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

    let watch = match WatchConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        "Starting document watcher (doc={}, poll={:?}, emulator={})",
        watch.document_path,
        watch.poll_interval,
        watch.emulator_host.as_deref().unwrap_or("none"),
    );

    let source = match FirestoreClient::new(&watch) {
        Ok(s) => s,
        Err(e) => {
            error!("{}", e);
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

    let cancel = shutdown_token();
    let (snapshot_tx, snapshot_rx) = mpsc::channel::<Snapshot>(16);

    let source_handle = tokio::spawn(source.run(snapshot_tx, cancel.clone()));

    info!("Watching {} (toggle mode: fan+door)", watch.document_path);
    ChangeWatcher::new(link).run(snapshot_rx, cancel.clone()).await;

    cancel.cancel();
    let _ = source_handle.await;
    info!("Document watcher stopped");
}
