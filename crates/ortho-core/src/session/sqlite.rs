//! Durable session backend using SQLite

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};

use crate::error::Result;
use crate::session::{ConversationState, Session, SessionStore};

/// SQLite-backed session store.
///
/// The connection is synchronous and guarded by a mutex; queries are tiny,
/// so each trait call does its work under the lock. This also gives each
/// `update` a single critical section per phone number.
pub struct SqliteSessionStore {
    conn: Mutex<Connection>,
}

impl SqliteSessionStore {
    /// Open (or create) the database at the given path
    pub fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_tables()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_tables()?;
        Ok(store)
    }

    fn init_tables(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "CREATE TABLE IF NOT EXISTS sessions (
                phone TEXT PRIMARY KEY,
                state TEXT NOT NULL,
                data TEXT NOT NULL,
                history TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    fn load(conn: &Connection, phone: &str) -> Result<Option<Session>> {
        let mut stmt = conn.prepare(
            "SELECT state, data, history, created_at, updated_at FROM sessions WHERE phone = ?1",
        )?;

        let row = stmt
            .query_row(params![phone], |row| {
                let state: String = row.get(0)?;
                let data: String = row.get(1)?;
                let history: String = row.get(2)?;
                let created_at: String = row.get(3)?;
                let updated_at: String = row.get(4)?;
                Ok((state, data, history, created_at, updated_at))
            })
            .optional()?;

        let Some((state, data, history, created_at, updated_at)) = row else {
            return Ok(None);
        };

        Ok(Some(Session {
            state: serde_json::from_value(serde_json::Value::String(state))?,
            data: serde_json::from_str(&data)?,
            history: serde_json::from_str(&history)?,
            created_at: created_at
                .parse()
                .map_err(|e| crate::Error::Session(format!("bad created_at: {}", e)))?,
            updated_at: updated_at
                .parse()
                .map_err(|e| crate::Error::Session(format!("bad updated_at: {}", e)))?,
        }))
    }

    fn save(conn: &Connection, phone: &str, session: &Session) -> Result<()> {
        conn.execute(
            "INSERT OR REPLACE INTO sessions (phone, state, data, history, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                phone,
                session.state.as_str(),
                serde_json::to_string(&session.data)?,
                serde_json::to_string(&session.history)?,
                session.created_at.to_rfc3339(),
                session.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn get_or_create(&self, phone: &str) -> Result<Session> {
        let conn = self.conn.lock().unwrap();
        if let Some(session) = Self::load(&conn, phone)? {
            return Ok(session);
        }

        let session = Session::default();
        Self::save(&conn, phone, &session)?;
        Ok(session)
    }

    async fn update(
        &self,
        phone: &str,
        state: Option<ConversationState>,
        patch: Option<HashMap<String, String>>,
    ) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let mut session = Self::load(&conn, phone)?.unwrap_or_default();

        if let Some(state) = state {
            session.state = state;
        }
        if let Some(patch) = patch {
            session.data.extend(patch);
        }
        session.updated_at = Utc::now();

        Self::save(&conn, phone, &session)
    }
}
