use std::env;
use std::net::IpAddr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct SerialConfig {
    /// Device path such as `/dev/ttyACM0` or `COM3`. `None` picks the first port found.
    pub port_path: Option<String>,
    pub baud_rate: u32,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Slash-separated Firestore document path, e.g. `houses/demo`.
    pub document_path: String,
    pub service_account_path: String,
    pub poll_interval: Duration,
    pub emulator_host: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: IpAddr,
    pub port: u16,
}

fn env_required(key: &str) -> Result<String, String> {
    env::var(key).map_err(|_| format!("{key} environment variable is required"))
}

fn env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

fn env_or_default<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl SerialConfig {
    pub fn from_env() -> Result<Self, String> {
        let config = Self {
            port_path: env_optional("SERIAL_PORT"),
            baud_rate: env_or_default("SERIAL_BAUD", 9600),
            timeout: Duration::from_millis(env_or_default("SERIAL_TIMEOUT_MS", 1000)),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), String> {
        if self.baud_rate == 0 {
            return Err("SERIAL_BAUD must be > 0".into());
        }
        Ok(())
    }
}

impl WatchConfig {
    pub fn from_env() -> Result<Self, String> {
        let config = Self {
            document_path: env_required("WATCH_DOC")?,
            service_account_path: env_or_default(
                "SERVICE_ACCOUNT_PATH",
                "config/serviceAccountKey.json".to_string(),
            ),
            poll_interval: Duration::from_millis(env_or_default("WATCH_POLL_INTERVAL_MS", 2000)),
            emulator_host: env_optional("FIRESTORE_EMULATOR_HOST"),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), String> {
        validate_document_path(&self.document_path)?;
        if self.poll_interval.is_zero() {
            return Err("WATCH_POLL_INTERVAL_MS must be > 0".into());
        }
        Ok(())
    }
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, String> {
        let host = env_or_default("API_HOST", "0.0.0.0".to_string());
        let host: IpAddr = host
            .parse()
            .map_err(|e| format!("API_HOST '{host}' is not an IP address: {e}"))?;

        Ok(Self {
            host,
            port: env_or_default("API_PORT", 5050),
        })
    }
}

/// A document path alternates collection and document ids, so it always has
/// an even number of non-empty segments.
fn validate_document_path(path: &str) -> Result<(), String> {
    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(format!("WATCH_DOC '{path}' contains an empty segment"));
    }
    if segments.len() % 2 != 0 {
        return Err(format!(
            "WATCH_DOC '{path}' must point at a document (collection/document), not a collection"
        ));
    }
    Ok(())
}
