//! ortho-meetings: video conference clients for ortho-gateway
//!
//! Zoom (server-to-server OAuth) and Google Meet (Calendar API) room
//! creation, combined behind the core `MeetingGateway` trait.

pub mod error;
pub mod meet;
pub mod service;
pub mod zoom;

pub use error::{MeetingError, Result};
pub use meet::GoogleMeetClient;
pub use service::MeetingService;
pub use zoom::ZoomClient;
