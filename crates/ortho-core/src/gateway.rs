//! External gateway contracts
//!
//! The conversation engine only ever talks to the outside world through
//! these traits. Each implementation lives in its own crate and maps its
//! transport errors into [`crate::Error`], so every call site decides
//! explicitly whether a failure degrades or propagates.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// An interactive reply button
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Button {
    pub id: String,
    pub title: String,
}

impl Button {
    pub fn new(id: &str, title: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
        }
    }
}

/// One row of an interactive list message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListRow {
    pub id: String,
    pub title: String,
    pub description: String,
}

/// A titled section of an interactive list message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListSection {
    pub title: String,
    pub rows: Vec<ListRow>,
}

/// Video conferencing platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingPlatform {
    Zoom,
    GoogleMeet,
}

impl MeetingPlatform {
    /// Wire name used by the directory API
    pub fn as_str(&self) -> &'static str {
        match self {
            MeetingPlatform::Zoom => "zoom",
            MeetingPlatform::GoogleMeet => "google_meet",
        }
    }
}

/// A created video conference room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeetingInfo {
    pub platform: MeetingPlatform,
    pub join_url: String,
    pub meeting_id: String,
    /// Zoom sets a password; Google Meet does not.
    pub password: Option<String>,
    pub start_time: String,
}

/// A patient record from the directory API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PatientRecord {
    #[serde(default)]
    pub id: Option<String>,
    pub cedula: String,
    #[serde(default)]
    pub nombre: String,
    #[serde(default)]
    pub apellidos: String,
}

/// An available appointment slot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub fecha: Option<String>,
    #[serde(default)]
    pub doctor: Option<String>,
}

/// A clinic contact phone entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactPhone {
    #[serde(default)]
    pub area: Option<String>,
    pub telefono: String,
}

/// Outbound WhatsApp messaging.
///
/// The engine treats sends as fire-and-forget: failures are logged by the
/// caller and never abort a conversation turn.
#[async_trait]
pub trait MessagingGateway: Send + Sync {
    async fn send_text(&self, to: &str, body: &str) -> Result<()>;

    async fn send_buttons(&self, to: &str, body: &str, buttons: &[Button]) -> Result<()>;

    async fn send_list(
        &self,
        to: &str,
        body: &str,
        button_label: &str,
        sections: &[ListSection],
    ) -> Result<()>;
}

/// Patient directory REST API.
#[async_trait]
pub trait PatientDirectoryGateway: Send + Sync {
    /// Look up a patient by national id number. `Ok(None)` means not found.
    async fn lookup(&self, cedula: &str) -> Result<Option<PatientRecord>>;

    async fn create(&self, cedula: &str, nombre: &str, apellidos: &str) -> Result<PatientRecord>;

    async fn available_appointments(&self) -> Result<Vec<Appointment>>;

    async fn contact_phones(&self) -> Result<Vec<ContactPhone>>;

    async fn save_study(&self, patient_id: &str, image_url: &str, image_type: &str) -> Result<()>;

    /// Persist a created video call. `patient_id` may be absent when the
    /// session never captured one; it is forwarded as-is, not validated.
    async fn save_meeting(
        &self,
        patient_id: Option<&str>,
        platform: MeetingPlatform,
        url: &str,
        meeting_id: &str,
    ) -> Result<()>;
}

/// AI medical assistant scoped to an orthopedic persona.
#[async_trait]
pub trait AiGateway: Send + Sync {
    async fn ask(&self, question: &str) -> Result<String>;
}

/// Video conference room creation.
#[async_trait]
pub trait MeetingGateway: Send + Sync {
    async fn create_zoom(&self, topic: &str, duration_minutes: u32) -> Result<MeetingInfo>;

    async fn create_meet(&self, summary: &str, duration_minutes: u32) -> Result<MeetingInfo>;
}
