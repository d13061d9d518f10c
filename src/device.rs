use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use serialport::available_ports;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::command::Command;
use crate::config::SerialConfig;
use crate::error::{GatewayError, Result};

/// Time the controller needs after the port opens; opening resets the board.
pub const SETTLE_DELAY: Duration = Duration::from_secs(2);

/// Line-oriented link to the fan/door/LCD controller.
///
/// Every `send_line` writes and flushes under one lock, so concurrent callers
/// never interleave bytes on the wire. The blocking I/O runs on the blocking
/// pool with the lock held.
pub struct DeviceLink {
    port: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl DeviceLink {
    /// Open the configured serial port and wait for the board to come up.
    pub async fn open(config: &SerialConfig) -> Result<Self> {
        let port_path = match &config.port_path {
            Some(path) => path.clone(),
            None => available_ports()?
                .first()
                .map(|port| port.port_name.clone())
                .ok_or_else(|| {
                    serialport::Error::new(
                        serialport::ErrorKind::NoDevice,
                        "SERIAL_PORT not set and no serial ports found",
                    )
                })?,
        };

        info!("Opening serial port {} at {} baud", port_path, config.baud_rate);

        let port = serialport::new(&port_path, config.baud_rate)
            .timeout(config.timeout)
            .open()?;

        tokio::time::sleep(SETTLE_DELAY).await;
        debug!("Serial port {} ready", port_path);

        Ok(Self::from_writer(port))
    }

    /// Wrap an arbitrary byte sink. No settle delay is applied.
    pub fn from_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            port: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    pub async fn send_line(&self, line: &str) -> Result<()> {
        let mut frame = String::with_capacity(line.len() + 1);
        frame.push_str(line);
        frame.push('\n');

        let mut port = Arc::clone(&self.port).lock_owned().await;
        tokio::task::spawn_blocking(move || {
            port.write_all(frame.as_bytes())?;
            port.flush()
        })
        .await
        .map_err(|e| GatewayError::Write(std::io::Error::other(e)))?
        .map_err(GatewayError::Write)?;

        debug!("Sent {:?}", line);
        Ok(())
    }

    pub async fn send(&self, command: &Command) -> Result<()> {
        self.send_line(&command.to_string()).await
    }
}
