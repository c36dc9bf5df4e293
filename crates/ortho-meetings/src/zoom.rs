//! Zoom meeting client
//!
//! Server-to-server OAuth (`account_credentials` grant) followed by a
//! meeting create on behalf of the account owner.

use chrono::{Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

use ortho_core::gateway::{MeetingInfo, MeetingPlatform};

use crate::error::{MeetingError, Result};

const DEFAULT_TOKEN_URL: &str = "https://zoom.us/oauth/token";
const DEFAULT_API_BASE: &str = "https://api.zoom.us/v2";

/// Zoom API client
#[derive(Debug, Clone)]
pub struct ZoomClient {
    client: Client,
    account_id: String,
    client_id: String,
    client_secret: String,
    token_url: String,
    api_base: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct ZoomMeeting {
    join_url: String,
    id: u64,
    password: Option<String>,
    start_time: String,
}

impl ZoomClient {
    /// Create a new Zoom client
    pub fn new(account_id: String, client_id: String, client_secret: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            account_id,
            client_id,
            client_secret,
            token_url: DEFAULT_TOKEN_URL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
        })
    }

    /// Create with custom endpoints (for testing)
    pub fn with_endpoints(
        account_id: String,
        client_id: String,
        client_secret: String,
        token_url: String,
        api_base: String,
    ) -> Result<Self> {
        let mut client = Self::new(account_id, client_id, client_secret)?;
        client.token_url = token_url;
        client.api_base = api_base;
        Ok(client)
    }

    /// Fetch a short-lived access token for the account
    async fn fetch_token(&self) -> Result<String> {
        debug!("Requesting Zoom OAuth token");

        let response = self
            .client
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[
                ("grant_type", "account_credentials"),
                ("account_id", self.account_id.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Zoom token request failed: {} - {}", status, body);
            return Err(MeetingError::Auth(format!("{}: {}", status, body)));
        }

        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }

    /// Create a meeting starting five minutes from now
    pub async fn create_meeting(&self, topic: &str, duration_minutes: u32) -> Result<MeetingInfo> {
        let access_token = self.fetch_token().await?;

        let start_time = (Utc::now() + Duration::minutes(5))
            .format("%Y-%m-%dT%H:%M:%S")
            .to_string();

        let url = format!("{}/users/me/meetings", self.api_base);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&access_token)
            .json(&meeting_body(topic, duration_minutes, &start_time))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Zoom meeting creation failed: {} - {}", status, body);
            return Err(MeetingError::Api(format!("{}: {}", status, body)));
        }

        let meeting: ZoomMeeting = response.json().await?;
        Ok(MeetingInfo {
            platform: MeetingPlatform::Zoom,
            join_url: meeting.join_url,
            meeting_id: meeting.id.to_string(),
            password: meeting.password,
            start_time: meeting.start_time,
        })
    }
}

fn meeting_body(topic: &str, duration_minutes: u32, start_time: &str) -> Value {
    json!({
        "topic": topic,
        "type": 2,
        "start_time": start_time,
        "duration": duration_minutes,
        "timezone": "America/Bogota",
        "settings": {
            "host_video": true,
            "participant_video": true,
            "join_before_host": true,
            "mute_upon_entry": false,
            "watermark": false,
            "audio": "both",
            "auto_recording": "none",
            "waiting_room": false,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meeting_body_shape() {
        let body = meeting_body("Consulta Ortopedia - Ana", 30, "2025-01-01T10:00:00");
        assert_eq!(body["topic"], "Consulta Ortopedia - Ana");
        assert_eq!(body["type"], 2);
        assert_eq!(body["duration"], 30);
        assert_eq!(body["timezone"], "America/Bogota");
        assert_eq!(body["settings"]["join_before_host"], true);
        assert_eq!(body["settings"]["waiting_room"], false);
    }

    #[test]
    fn test_meeting_response_parsing() {
        let body = r#"{
            "id": 999,
            "join_url": "https://zoom.us/j/999",
            "password": "abc",
            "start_time": "2025-01-01T10:00:00Z",
            "topic": "Consulta"
        }"#;
        let meeting: ZoomMeeting = serde_json::from_str(body).unwrap();
        assert_eq!(meeting.id, 999);
        assert_eq!(meeting.join_url, "https://zoom.us/j/999");
        assert_eq!(meeting.password.as_deref(), Some("abc"));
    }

    #[test]
    fn test_meeting_response_without_password() {
        let body = r#"{
            "id": 1,
            "join_url": "https://zoom.us/j/1",
            "start_time": "2025-01-01T10:00:00Z"
        }"#;
        let meeting: ZoomMeeting = serde_json::from_str(body).unwrap();
        assert!(meeting.password.is_none());
    }
}
