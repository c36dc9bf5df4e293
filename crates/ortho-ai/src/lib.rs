//! ortho-ai: AI medical assistant client for ortho-gateway
//!
//! OpenAI-compatible chat-completion client scoped to an orthopedic
//! assistant persona.

pub mod client;
pub mod error;

pub use client::OpenAiClient;
pub use error::{AiError, Result};
