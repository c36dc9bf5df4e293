//! OpenAI-compatible chat-completion client

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use ortho_core::gateway::AiGateway;

use crate::error::{AiError, Result};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// System prompt scoping the assistant to orthopedics
const SYSTEM_PROMPT: &str = "Eres un asistente médico especializado en ortopedia. \
    Proporciona respuestas precisas, profesionales y basadas en evidencia médica. \
    Si la pregunta está fuera de tu especialidad, indícalo claramente. \
    Siempre recomienda consultar con un médico para diagnósticos definitivos.";

/// Chat-completion API client
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

impl OpenAiClient {
    /// Create a new client
    pub fn new(api_key: String, model: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            api_key,
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Create with a custom base URL (for testing or compatible endpoints)
    pub fn with_base_url(api_key: String, model: String, base_url: String) -> Result<Self> {
        let mut client = Self::new(api_key, model)?;
        client.base_url = base_url;
        Ok(client)
    }

    fn build_request(&self, question: &str) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: question.to_string(),
                },
            ],
            max_tokens: 500,
            temperature: 0.7,
        }
    }

    async fn complete(&self, question: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        debug!("Sending chat completion request to {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.build_request(question))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!("AI API error: {} - {}", status, body);
            return Err(AiError::Api(format!("{}: {}", status, body)));
        }

        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| AiError::Api(format!("Failed to parse response: {} - {}", e, body)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or(AiError::EmptyResponse)
    }
}

#[async_trait]
impl AiGateway for OpenAiClient {
    async fn ask(&self, question: &str) -> ortho_core::Result<String> {
        let answer = self.complete(question).await?;
        Ok(answer)
    }
}
