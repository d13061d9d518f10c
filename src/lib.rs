//! Home-automation gateway for a fan/door/LCD controller on a serial link.
//!
//! Three front-ends share one [`DeviceLink`]: a Firestore document watcher,
//! a local HTTP API and an interactive probe.

pub mod api;
pub mod command;
pub mod config;
pub mod device;
pub mod error;
pub mod firestore;
pub mod probe;
pub mod shutdown;
pub mod watcher;

pub use command::Command;
pub use device::DeviceLink;
pub use error::GatewayError;

/// Install the fmt subscriber, honouring `RUST_LOG` and defaulting to `info`.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
