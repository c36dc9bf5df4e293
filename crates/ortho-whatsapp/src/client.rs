//! WhatsApp Cloud API client

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use ortho_core::gateway::{Button, ListSection, MessagingGateway};

use crate::error::{Result, WhatsAppError};

const DEFAULT_BASE_URL: &str = "https://graph.facebook.com/v22.0";

/// Graph API messaging client
#[derive(Debug, Clone)]
pub struct CloudApiClient {
    client: Client,
    token: String,
    phone_id: String,
    base_url: String,
}

impl CloudApiClient {
    /// Create a new Cloud API client
    pub fn new(token: String, phone_id: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            token,
            phone_id,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Create with a custom base URL (for testing)
    pub fn with_base_url(token: String, phone_id: String, base_url: String) -> Result<Self> {
        let mut client = Self::new(token, phone_id)?;
        client.base_url = base_url;
        Ok(client)
    }

    /// Post one message payload to the Graph API
    async fn send(&self, payload: Value) -> Result<()> {
        let url = format!("{}/{}/messages", self.base_url, self.phone_id);
        debug!("Sending WhatsApp payload to {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Cloud API error: {} - {}", status, body);
            return Err(WhatsAppError::Api(format!("{}: {}", status, body)));
        }

        Ok(())
    }
}

fn text_payload(to: &str, body: &str) -> Value {
    json!({
        "messaging_product": "whatsapp",
        "to": to,
        "type": "text",
        "text": { "body": body },
    })
}

fn buttons_payload(to: &str, body: &str, buttons: &[Button]) -> Value {
    let buttons: Vec<Value> = buttons
        .iter()
        .map(|b| {
            json!({
                "type": "reply",
                "reply": { "id": b.id, "title": b.title },
            })
        })
        .collect();

    json!({
        "messaging_product": "whatsapp",
        "to": to,
        "type": "interactive",
        "interactive": {
            "type": "button",
            "body": { "text": body },
            "action": { "buttons": buttons },
        },
    })
}

fn list_payload(to: &str, body: &str, button_label: &str, sections: &[ListSection]) -> Value {
    json!({
        "messaging_product": "whatsapp",
        "to": to,
        "type": "interactive",
        "interactive": {
            "type": "list",
            "body": { "text": body },
            "action": {
                "button": button_label,
                "sections": sections,
            },
        },
    })
}

#[async_trait]
impl MessagingGateway for CloudApiClient {
    async fn send_text(&self, to: &str, body: &str) -> ortho_core::Result<()> {
        info!("Sending WhatsApp text to {}", to);
        self.send(text_payload(to, body)).await?;
        Ok(())
    }

    async fn send_buttons(
        &self,
        to: &str,
        body: &str,
        buttons: &[Button],
    ) -> ortho_core::Result<()> {
        info!("Sending WhatsApp buttons to {}", to);
        self.send(buttons_payload(to, body, buttons)).await?;
        Ok(())
    }

    async fn send_list(
        &self,
        to: &str,
        body: &str,
        button_label: &str,
        sections: &[ListSection],
    ) -> ortho_core::Result<()> {
        info!("Sending WhatsApp list to {}", to);
        self.send(list_payload(to, body, button_label, sections))
            .await?;
        Ok(())
    }
}
