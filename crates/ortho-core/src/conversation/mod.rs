//! Conversation state machine and engine

mod engine;
mod event;
mod machine;

pub use engine::{ConversationEngine, FALLBACK_ANSWER};
pub use event::{EventKind, InboundEvent};
pub use machine::{Effect, Step, transition};
