//! Inbound webhook envelope and dispatcher
//!
//! Classifies one Cloud API event delivery into an [`InboundEvent`] (or an
//! acknowledged no-op), and implements the GET verification handshake.

use serde::Deserialize;
use tracing::debug;

use ortho_core::conversation::InboundEvent;

use crate::error::{Result, WhatsAppError};

/// Top-level webhook event envelope
#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub entry: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub changes: Vec<Change>,
}

#[derive(Debug, Deserialize)]
pub struct Change {
    pub value: ChangeValue,
}

/// The `value` object of a change. Status callbacks carry no `messages`
/// field; those deliveries are acknowledged and ignored.
#[derive(Debug, Deserialize)]
pub struct ChangeValue {
    pub messages: Option<Vec<IncomingMessage>>,
}

/// One inbound message
#[derive(Debug, Deserialize)]
pub struct IncomingMessage {
    pub from: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub text: Option<TextBody>,
    pub interactive: Option<Interactive>,
}

#[derive(Debug, Deserialize)]
pub struct TextBody {
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct Interactive {
    #[serde(rename = "type")]
    pub kind: String,
    pub button_reply: Option<Reply>,
    pub list_reply: Option<Reply>,
}

#[derive(Debug, Deserialize)]
pub struct Reply {
    pub id: String,
}

/// Outcome of classifying one webhook delivery
#[derive(Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// A message to route to the conversation engine
    Event(InboundEvent),
    /// Acknowledged no-op (status callback, unsupported message type)
    Ignored,
}

/// Deserialize a webhook body.
///
/// Shape errors surface as `InvalidPayload` so the route can answer 500
/// instead of an extractor rejection.
pub fn parse_payload(body: serde_json::Value) -> Result<WebhookPayload> {
    serde_json::from_value(body).map_err(|e| WhatsAppError::InvalidPayload(e.to_string()))
}

/// Classify the first message of the first change of the first entry.
///
/// Deliveries without a `messages` field and messages of unsupported types
/// are deliberately ignored, not errors.
pub fn classify(payload: &WebhookPayload) -> Result<Dispatch> {
    let entry = payload
        .entry
        .first()
        .ok_or_else(|| WhatsAppError::InvalidPayload("missing entry".to_string()))?;
    let change = entry
        .changes
        .first()
        .ok_or_else(|| WhatsAppError::InvalidPayload("missing changes".to_string()))?;

    let Some(messages) = &change.value.messages else {
        debug!("webhook delivery without messages field, ignoring");
        return Ok(Dispatch::Ignored);
    };
    let message = messages
        .first()
        .ok_or_else(|| WhatsAppError::InvalidPayload("empty messages array".to_string()))?;

    match message.kind.as_str() {
        "text" => {
            let text = message
                .text
                .as_ref()
                .ok_or_else(|| WhatsAppError::InvalidPayload("text message without body".to_string()))?;
            let body = text.body.to_lowercase().trim().to_string();
            Ok(Dispatch::Event(InboundEvent::text(&message.from, &body)))
        }
        "interactive" => {
            let interactive = message.interactive.as_ref().ok_or_else(|| {
                WhatsAppError::InvalidPayload("interactive message without payload".to_string())
            })?;

            match interactive.kind.as_str() {
                "button_reply" => {
                    let reply = interactive.button_reply.as_ref().ok_or_else(|| {
                        WhatsAppError::InvalidPayload("missing button_reply".to_string())
                    })?;
                    Ok(Dispatch::Event(InboundEvent::button(&message.from, &reply.id)))
                }
                "list_reply" => {
                    let reply = interactive.list_reply.as_ref().ok_or_else(|| {
                        WhatsAppError::InvalidPayload("missing list_reply".to_string())
                    })?;
                    Ok(Dispatch::Event(InboundEvent::list(&message.from, &reply.id)))
                }
                other => {
                    debug!("unsupported interactive type {:?}, ignoring", other);
                    Ok(Dispatch::Ignored)
                }
            }
        }
        other => {
            debug!("unsupported message type {:?}, ignoring", other);
            Ok(Dispatch::Ignored)
        }
    }
}

/// Verify a webhook subscription (GET handshake).
///
/// WhatsApp sends `hub.mode=subscribe`, `hub.verify_token` and
/// `hub.challenge`; the challenge is echoed back when the token matches.
pub fn verify_subscription(
    mode: Option<&str>,
    token: Option<&str>,
    challenge: Option<&str>,
    verify_token: &str,
) -> Option<String> {
    let mode = mode?;
    let token = token?;
    let challenge = challenge?;

    if mode == "subscribe" && token == verify_token {
        Some(challenge.to_string())
    } else {
        None
    }
}
