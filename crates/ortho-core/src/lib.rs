//! ortho-core: Orthopedic WhatsApp Gateway Core Library
//!
//! Conversation state machine, session store and gateway contracts for the
//! clinic's WhatsApp front-end. The external services (WhatsApp Cloud API,
//! patient directory, AI assistant, Zoom/Google Meet) are consumed through
//! the traits in [`gateway`] and implemented in their own crates.

pub mod config;
pub mod conversation;
pub mod error;
pub mod gateway;
pub mod session;

pub use config::Config;
pub use conversation::{ConversationEngine, EventKind, InboundEvent, Step, transition};
pub use error::{Error, Result};
pub use gateway::{
    AiGateway, Appointment, Button, ContactPhone, ListRow, ListSection, MeetingGateway,
    MeetingInfo, MeetingPlatform, MessagingGateway, PatientDirectoryGateway, PatientRecord,
};
pub use session::{
    ConversationState, MemorySessionStore, Session, SessionStore, SqliteSessionStore,
};
