//! Google Meet client
//!
//! Creates a Calendar event carrying a Meet conference. Authenticates with
//! an OAuth refresh-token exchange; the resulting access token is fetched
//! per call, mirroring the Zoom flow.

use chrono::{Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

use ortho_core::gateway::{MeetingInfo, MeetingPlatform};

use crate::error::{MeetingError, Result};

const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const DEFAULT_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Google Calendar / Meet client
#[derive(Debug, Clone)]
pub struct GoogleMeetClient {
    client: Client,
    client_id: String,
    client_secret: String,
    refresh_token: String,
    calendar_id: String,
    token_url: String,
    api_base: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl GoogleMeetClient {
    /// Create a new Google Meet client
    pub fn new(
        client_id: String,
        client_secret: String,
        refresh_token: String,
        calendar_id: String,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            client_id,
            client_secret,
            refresh_token,
            calendar_id,
            token_url: DEFAULT_TOKEN_URL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
        })
    }

    /// Create with custom endpoints (for testing)
    pub fn with_endpoints(
        client_id: String,
        client_secret: String,
        refresh_token: String,
        calendar_id: String,
        token_url: String,
        api_base: String,
    ) -> Result<Self> {
        let mut client = Self::new(client_id, client_secret, refresh_token, calendar_id)?;
        client.token_url = token_url;
        client.api_base = api_base;
        Ok(client)
    }

    async fn fetch_token(&self) -> Result<String> {
        debug!("Requesting Google OAuth token");

        let response = self
            .client
            .post(&self.token_url)
            .form(&[
                ("grant_type", "refresh_token"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", self.refresh_token.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Google token request failed: {} - {}", status, body);
            return Err(MeetingError::Auth(format!("{}: {}", status, body)));
        }

        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }

    /// Create a Meet event starting five minutes from now
    pub async fn create_meeting(&self, summary: &str, duration_minutes: u32) -> Result<MeetingInfo> {
        let access_token = self.fetch_token().await?;

        let start = Utc::now() + Duration::minutes(5);
        let end = start + Duration::minutes(duration_minutes as i64);
        let request_id = format!("meet-{}", start.timestamp());

        let url = format!(
            "{}/calendars/{}/events?conferenceDataVersion=1",
            self.api_base, self.calendar_id
        );
        let response = self
            .client
            .post(&url)
            .bearer_auth(&access_token)
            .json(&event_body(
                summary,
                &start.format("%Y-%m-%dT%H:%M:%S").to_string(),
                &end.format("%Y-%m-%dT%H:%M:%S").to_string(),
                &request_id,
            ))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Google event creation failed: {} - {}", status, body);
            return Err(MeetingError::Api(format!("{}: {}", status, body)));
        }

        let event: Value = response.json().await?;
        event_to_meeting(&event)
    }
}

fn event_body(summary: &str, start: &str, end: &str, request_id: &str) -> Value {
    json!({
        "summary": summary,
        "description": "Consulta médica de ortopedia por videollamada",
        "start": { "dateTime": start, "timeZone": "America/Bogota" },
        "end": { "dateTime": end, "timeZone": "America/Bogota" },
        "conferenceData": {
            "createRequest": {
                "requestId": request_id,
                "conferenceSolutionKey": { "type": "hangoutsMeet" },
            },
        },
        "attendees": [],
        "reminders": {
            "useDefault": false,
            "overrides": [ { "method": "popup", "minutes": 10 } ],
        },
    })
}

/// Pull the Meet link out of a created event: `hangoutLink` when present,
/// otherwise the video entry point of the conference data.
fn meet_link(event: &Value) -> Option<String> {
    if let Some(link) = event["hangoutLink"].as_str() {
        return Some(link.to_string());
    }

    event["conferenceData"]["entryPoints"]
        .as_array()?
        .iter()
        .find(|entry| entry["entryPointType"] == "video")
        .and_then(|entry| entry["uri"].as_str())
        .map(str::to_string)
}

fn event_to_meeting(event: &Value) -> Result<MeetingInfo> {
    let join_url = meet_link(event).ok_or(MeetingError::MissingJoinLink)?;
    let event_id = event["id"]
        .as_str()
        .ok_or_else(|| MeetingError::Api("event response missing id".to_string()))?;
    let start_time = event["start"]["dateTime"].as_str().unwrap_or_default();

    Ok(MeetingInfo {
        platform: MeetingPlatform::GoogleMeet,
        join_url,
        meeting_id: event_id.to_string(),
        password: None,
        start_time: start_time.to_string(),
    })
}
