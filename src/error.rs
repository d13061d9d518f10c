use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Serial transport unavailable: {0}")]
    TransportUnavailable(#[from] serialport::Error),

    #[error("Failed to write to device: {0}")]
    Write(#[source] std::io::Error),

    #[error("Document subscription error: {0}")]
    Subscription(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, GatewayError>;
