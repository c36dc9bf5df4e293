//! Per-phone-number conversation sessions

mod sqlite;
mod store;
mod types;

pub use sqlite::SqliteSessionStore;
pub use store::{MemorySessionStore, SessionStore};
pub use types::{ConversationState, Exchange, Session};
