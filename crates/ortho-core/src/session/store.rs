//! Session store contract and in-memory backend

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::session::{ConversationState, Session};

/// Storage backend for conversation sessions.
///
/// The conversation engine is the only writer. Both operations create the
/// session with default state when the phone number is unknown. Each
/// `update` runs under a single backend write section, so concurrent turns
/// for the same phone number cannot interleave a read-modify-write.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Return the session for `phone`, creating it in `Initial` state if
    /// absent.
    async fn get_or_create(&self, phone: &str) -> Result<Session>;

    /// Overwrite the state and/or shallow-merge `patch` into the session
    /// data (last write wins per key). Absent arguments are no-ops.
    async fn update(
        &self,
        phone: &str,
        state: Option<ConversationState>,
        patch: Option<HashMap<String, String>>,
    ) -> Result<()>;
}

/// In-memory session store. Sessions live for the process lifetime.
///
/// This is the default backend; it never returns an error.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of live sessions
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get_or_create(&self, phone: &str) -> Result<Session> {
        {
            let sessions = self.sessions.read().await;
            if let Some(session) = sessions.get(phone) {
                return Ok(session.clone());
            }
        }

        let mut sessions = self.sessions.write().await;
        let session = sessions.entry(phone.to_string()).or_default();
        Ok(session.clone())
    }

    async fn update(
        &self,
        phone: &str,
        state: Option<ConversationState>,
        patch: Option<HashMap<String, String>>,
    ) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.entry(phone.to_string()).or_default();

        if let Some(state) = state {
            session.state = state;
        }
        if let Some(patch) = patch {
            session.data.extend(patch);
        }
        session.updated_at = Utc::now();
        Ok(())
    }
}

impl Clone for MemorySessionStore {
    fn clone(&self) -> Self {
        Self {
            sessions: Arc::clone(&self.sessions),
        }
    }
}
