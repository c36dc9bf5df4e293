//! Session data model

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Conversation state, one per session.
///
/// `AwaitingCedula`, `ConsultasMenu` and `DoctorChat` are entered by
/// transitions but currently consume no further input; see the transition
/// table in [`crate::conversation::machine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConversationState {
    #[default]
    Initial,
    AwaitingCedula,
    MainMenu,
    ConsultasMenu,
    DoctorChat,
    SelectingVideoPlatform,
}

impl ConversationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversationState::Initial => "initial",
            ConversationState::AwaitingCedula => "awaiting_cedula",
            ConversationState::MainMenu => "main_menu",
            ConversationState::ConsultasMenu => "consultas_menu",
            ConversationState::DoctorChat => "doctor_chat",
            ConversationState::SelectingVideoPlatform => "selecting_video_platform",
        }
    }

    /// All states, for exhaustive table tests.
    pub const ALL: [ConversationState; 6] = [
        ConversationState::Initial,
        ConversationState::AwaitingCedula,
        ConversationState::MainMenu,
        ConversationState::ConsultasMenu,
        ConversationState::DoctorChat,
        ConversationState::SelectingVideoPlatform,
    ];
}

/// One past exchange of a conversation.
///
/// Kept in the model for parity with the session schema; no transition
/// logic currently writes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exchange {
    pub inbound: String,
    pub outbound: String,
    pub at: DateTime<Utc>,
}

/// A single conversation session, keyed by phone number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub state: ConversationState,

    /// Fields accumulated across turns (e.g. `nombre`, `patient_id`).
    /// Keys are only ever added or overwritten, never removed.
    pub data: HashMap<String, String>,

    pub history: Vec<Exchange>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for Session {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            state: ConversationState::Initial,
            data: HashMap::new(),
            history: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_session() {
        let session = Session::default();
        assert_eq!(session.state, ConversationState::Initial);
        assert!(session.data.is_empty());
        assert!(session.history.is_empty());
    }

    #[test]
    fn test_state_serialization() {
        let json = serde_json::to_string(&ConversationState::AwaitingCedula).unwrap();
        assert_eq!(json, "\"awaiting_cedula\"");

        let state: ConversationState = serde_json::from_str("\"main_menu\"").unwrap();
        assert_eq!(state, ConversationState::MainMenu);
    }

    #[test]
    fn test_state_names_match_serde() {
        for state in ConversationState::ALL {
            let json = serde_json::to_string(&state).unwrap();
            assert_eq!(json, format!("\"{}\"", state.as_str()));
        }
    }
}
