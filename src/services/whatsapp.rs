//! WhatsApp Cloud API channel
//!
//! Delivers the plain-text digest through the `/{phone_number_id}/messages`
//! endpoint of the Meta Graph API.

use reqwest::Client;
use std::time::Duration;

use crate::config::WhatsAppSettings;
use crate::models::ScoredListing;
use crate::services::digest;
use crate::services::notifier::{Notifier, NotifyError};

/// Sends match digests as WhatsApp text messages
#[derive(Debug)]
pub struct WhatsAppNotifier {
    api_base: String,
    api_token: String,
    phone_number_id: String,
    recipient: String,
    client: Client,
}

impl WhatsAppNotifier {
    /// Creates a `WhatsAppNotifier` from settings
    ///
    /// Returns [`NotifyError::Config`] if the token, phone number id or
    /// recipient is missing.
    pub fn from_settings(settings: &WhatsAppSettings) -> Result<Self, NotifyError> {
        let (Some(api_token), Some(phone_number_id), Some(recipient)) = (
            settings.api_token.clone().filter(|v| !v.is_empty()),
            settings.phone_number_id.clone().filter(|v| !v.is_empty()),
            settings.recipient_phone.clone().filter(|v| !v.is_empty()),
        ) else {
            return Err(NotifyError::Config(
                "WhatsApp API token, phone number id and recipient are required".to_string(),
            ));
        };

        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            api_token,
            phone_number_id,
            recipient,
            client,
        })
    }
}

#[async_trait::async_trait]
impl Notifier for WhatsAppNotifier {
    async fn notify(&self, matches: &[ScoredListing]) -> Result<(), NotifyError> {
        let url = format!("{}/{}/messages", self.api_base, self.phone_number_id);

        let payload = serde_json::json!({
            "messaging_product": "whatsapp",
            "to": self.recipient,
            "type": "text",
            "text": { "body": digest::render_text(matches) },
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_token)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read body".to_string());
            return Err(NotifyError::Api {
                status: status.as_u16(),
                body,
            });
        }

        // The message is accepted once the API answers 2xx; the id is only logged
        let resp_body: Option<serde_json::Value> = response.json().await.ok();
        let message_id = resp_body
            .as_ref()
            .and_then(|body| body.get("messages"))
            .and_then(|m| m.get(0))
            .and_then(|m| m.get("id"))
            .and_then(|id| id.as_str())
            .unwrap_or("unknown");

        tracing::info!("WhatsApp message sent (ID: {})", message_id);
        Ok(())
    }

    fn channel_name(&self) -> &str {
        "whatsapp"
    }
}
