//! Notification channel trait and the dispatcher that fans a digest out
//! to every configured channel.

use crate::models::ScoredListing;

/// Errors that can occur during notification delivery
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("SMTP delivery failed: {0}")]
    Smtp(String),

    #[error("Template rendering failed: {0}")]
    Template(#[from] minijinja::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("API returned {status}: {body}")]
    Api { status: u16, body: String },
}

/// A channel that can deliver a digest of new matches
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one digest covering all `matches`
    async fn notify(&self, matches: &[ScoredListing]) -> Result<(), NotifyError>;

    /// Human-readable name for this channel (e.g., "email", "whatsapp")
    fn channel_name(&self) -> &str;
}

/// Result of delivering a digest to a single channel
#[derive(Debug)]
pub struct DispatchResult {
    pub channel: String,
    pub success: bool,
    pub error: Option<String>,
    pub duration_ms: u64,
}

/// Delivers digests to every registered channel
///
/// Channels run one after another. A failing channel is logged and does
/// not stop the rest.
#[derive(Default)]
pub struct Dispatcher {
    channels: Vec<Box<dyn Notifier>>,
}

impl Dispatcher {
    pub fn new(channels: Vec<Box<dyn Notifier>>) -> Self {
        Self { channels }
    }

    /// Create a dispatcher with no channels
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn add_channel(&mut self, channel: Box<dyn Notifier>) {
        self.channels.push(channel);
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Send the digest to all channels
    ///
    /// Returns one result per channel, or nothing when `matches` is empty.
    pub async fn notify_all(&self, matches: &[ScoredListing]) -> Vec<DispatchResult> {
        if matches.is_empty() {
            return Vec::new();
        }

        if self.channels.is_empty() {
            tracing::warn!(matches = matches.len(), "No notification channels configured");
            return Vec::new();
        }

        let mut results = Vec::with_capacity(self.channels.len());

        for channel in &self.channels {
            let start = std::time::Instant::now();
            let result = channel.notify(matches).await;
            let duration_ms = start.elapsed().as_millis() as u64;

            let (success, error) = match result {
                Ok(()) => {
                    tracing::info!(
                        channel = channel.channel_name(),
                        matches = matches.len(),
                        duration_ms,
                        "Notification delivered"
                    );
                    (true, None)
                }
                Err(e) => {
                    tracing::error!(
                        channel = channel.channel_name(),
                        error = %e,
                        duration_ms,
                        "Notification delivery failed"
                    );
                    (false, Some(e.to_string()))
                }
            };

            results.push(DispatchResult {
                channel: channel.channel_name().to_string(),
                success,
                error,
                duration_ms,
            });
        }

        results
    }
}
