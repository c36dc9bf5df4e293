//! ortho-whatsapp: WhatsApp Cloud API channel for ortho-gateway
//!
//! Outbound messaging through the Graph API and inbound webhook
//! classification (text / button reply / list reply).

pub mod client;
pub mod error;
pub mod webhook;

pub use client::CloudApiClient;
pub use error::{Result, WhatsAppError};
pub use webhook::{Dispatch, WebhookPayload, classify, parse_payload, verify_subscription};
