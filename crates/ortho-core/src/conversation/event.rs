//! Inbound event model

/// What the user sent, after webhook classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// Free text, already lower-cased and trimmed by the dispatcher
    Text(String),
    /// Selected interactive button id
    ButtonReply(String),
    /// Selected interactive list row id
    ListReply(String),
}

/// One classified inbound webhook delivery. Transient: lives only for the
/// duration of a single dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    /// Sender phone number
    pub sender: String,
    pub kind: EventKind,
}

impl InboundEvent {
    pub fn text(sender: &str, body: &str) -> Self {
        Self {
            sender: sender.to_string(),
            kind: EventKind::Text(body.to_string()),
        }
    }

    pub fn button(sender: &str, id: &str) -> Self {
        Self {
            sender: sender.to_string(),
            kind: EventKind::ButtonReply(id.to_string()),
        }
    }

    pub fn list(sender: &str, id: &str) -> Self {
        Self {
            sender: sender.to_string(),
            kind: EventKind::ListReply(id.to_string()),
        }
    }
}
