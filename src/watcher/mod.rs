pub mod state;

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::device::DeviceLink;
use crate::firestore::Snapshot;

pub use state::{Change, DoorState, FanState, ObservedState};

/// Turns document changes into device commands.
///
/// Delivery is best-effort: a field's state advances before its command is
/// written, and a failed write is logged but neither retried nor rolled back.
pub struct ChangeWatcher {
    link: Arc<DeviceLink>,
    state: ObservedState,
}

impl ChangeWatcher {
    pub fn new(link: Arc<DeviceLink>) -> Self {
        Self {
            link,
            state: ObservedState::new(),
        }
    }

    pub fn state(&self) -> &ObservedState {
        &self.state
    }

    /// Apply one snapshot, sending every resulting command in order. Returns
    /// the number of commands that reached the transport.
    pub async fn handle_snapshot(&mut self, snapshot: &Snapshot) -> usize {
        let mut sent = 0;

        for document in &snapshot.documents {
            let changes = self.state.observe(&document.fields);
            if changes.is_empty() {
                debug!("No changes in {}", document.name);
            }

            for change in changes {
                let command = change.command();
                match self.link.send(&command).await {
                    Ok(()) => {
                        info!("{}", change);
                        sent += 1;
                    }
                    Err(e) => warn!("Failed to send {} for {:?}: {}", command, change, e),
                }
            }
        }

        sent
    }

    /// Consume snapshots until cancelled or the source hangs up.
    pub async fn run(
        mut self,
        mut snapshot_rx: mpsc::Receiver<Snapshot>,
        cancel: CancellationToken,
    ) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Change watcher stopped");
                    break;
                }
                snapshot = snapshot_rx.recv() => {
                    match snapshot {
                        Some(snapshot) => {
                            self.handle_snapshot(&snapshot).await;
                        }
                        None => {
                            warn!("Snapshot source closed, stopping watcher");
                            break;
                        }
                    }
                }
            }
        }
    }
}
