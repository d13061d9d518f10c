use std::time::Duration;

use reqwest::{Client, StatusCode};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::WatchConfig;
use crate::error::{GatewayError, Result};

use super::auth::{ServiceAccount, TokenProvider};
use super::{Document, RawDocument, Snapshot};

const FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

enum Access {
    OAuth(TokenProvider),
    /// The local emulator accepts any bearer; `owner` bypasses security rules.
    Emulator { project_id: String },
}

/// Polls a single Firestore document and delivers a snapshot whenever its
/// `updateTime` moves.
pub struct FirestoreClient {
    http: Client,
    base_url: String,
    document_path: String,
    access: Access,
    poll_interval: Duration,
    last_update: Option<String>,
}

impl FirestoreClient {
    pub fn new(config: &WatchConfig) -> Result<Self> {
        let (base_url, access) = match &config.emulator_host {
            Some(host) => {
                // Emulator accepts any project id; reuse the key file's if there is one.
                let project_id = ServiceAccount::from_file(&config.service_account_path)
                    .map(|a| a.project_id)
                    .unwrap_or_else(|_| "demo-smarthouse".to_string());
                (format!("http://{host}/v1"), Access::Emulator { project_id })
            }
            None => {
                let account = ServiceAccount::from_file(&config.service_account_path)?;
                (
                    FIRESTORE_BASE_URL.to_string(),
                    Access::OAuth(TokenProvider::new(account)),
                )
            }
        };

        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| GatewayError::Subscription(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url,
            document_path: config.document_path.trim_matches('/').to_string(),
            access,
            poll_interval: config.poll_interval,
            last_update: None,
        })
    }

    fn project_id(&self) -> &str {
        match &self.access {
            Access::OAuth(provider) => provider.project_id(),
            Access::Emulator { project_id } => project_id,
        }
    }

    pub fn document_url(&self) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents/{}",
            self.base_url,
            self.project_id(),
            self.document_path
        )
    }

    /// Poll until cancelled, backing off on errors.
    pub async fn run(mut self, snapshot_tx: mpsc::Sender<Snapshot>, cancel: CancellationToken) {
        let mut backoff = Backoff::new(Duration::from_secs(5), Duration::from_secs(60));

        info!("Watching document {}", self.document_path);

        loop {
            let polled = tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Document poller stopped");
                    return;
                }
                polled = self.poll(&snapshot_tx) => polled,
            };

            let wait = match polled {
                Ok(()) => {
                    backoff.reset();
                    self.poll_interval
                }
                Err(e) => {
                    let wait = backoff.next_delay();
                    error!(
                        "Poll of {} failed: {}. Retrying in {:?}",
                        self.document_path, e, wait
                    );
                    wait
                }
            };

            if snapshot_tx.is_closed() {
                warn!("Snapshot channel closed, stopping poller");
                return;
            }

            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Document poller stopped");
                    return;
                }
                _ = tokio::time::sleep(wait) => {}
            }
        }
    }

    async fn poll(&mut self, snapshot_tx: &mpsc::Sender<Snapshot>) -> Result<()> {
        let (document, update_time) = self.fetch().await?;

        if self.last_update.is_some() && self.last_update == update_time {
            return Ok(());
        }
        debug!("Document {} updated at {:?}", document.name, update_time);
        self.last_update = update_time;

        if snapshot_tx.send(Snapshot::single(document)).await.is_err() {
            warn!("Snapshot channel closed");
        }
        Ok(())
    }

    /// Fetch the document. A missing document reads as one with no fields.
    async fn fetch(&mut self) -> Result<(Document, Option<String>)> {
        let url = self.document_url();
        let bearer = match &mut self.access {
            Access::OAuth(provider) => provider.access_token(&self.http).await?,
            Access::Emulator { .. } => "owner".to_string(),
        };

        let response = self
            .http
            .get(&url)
            .bearer_auth(bearer)
            .send()
            .await
            .map_err(|e| GatewayError::Subscription(format!("GET {url} failed: {e}")))?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                let document = Document {
                    name: self.document_path.clone(),
                    ..Default::default()
                };
                Ok((document, Some(MISSING.to_string())))
            }
            status if status.is_success() => {
                let raw: RawDocument = response
                    .json()
                    .await
                    .map_err(|e| GatewayError::Subscription(format!("Bad document body: {e}")))?;
                let update_time = raw.update_time.clone();
                Ok((raw.into_document(), update_time))
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(GatewayError::Subscription(format!("GET {url} returned {status}: {body}")))
            }
        }
    }
}

/// Sentinel update marker for a document that does not exist.
const MISSING: &str = "<missing>";

/// Exponential retry delay, doubling up to a ceiling.
#[derive(Debug, Clone)]
struct Backoff {
    initial: Duration,
    current: Duration,
    max: Duration,
}

impl Backoff {
    fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            current: initial,
            max,
        }
    }

    fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = (self.current * 2).min(self.max);
        delay
    }

    fn reset(&mut self) {
        self.current = self.initial;
    }
}
