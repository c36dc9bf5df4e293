//! Combined meeting gateway

use async_trait::async_trait;

use ortho_core::gateway::{MeetingGateway, MeetingInfo};

use crate::meet::GoogleMeetClient;
use crate::zoom::ZoomClient;

/// Implements the core `MeetingGateway` over both platform clients.
pub struct MeetingService {
    zoom: ZoomClient,
    meet: GoogleMeetClient,
}

impl MeetingService {
    pub fn new(zoom: ZoomClient, meet: GoogleMeetClient) -> Self {
        Self { zoom, meet }
    }
}

#[async_trait]
impl MeetingGateway for MeetingService {
    async fn create_zoom(&self, topic: &str, duration_minutes: u32) -> ortho_core::Result<MeetingInfo> {
        let meeting = self.zoom.create_meeting(topic, duration_minutes).await?;
        Ok(meeting)
    }

    async fn create_meet(&self, summary: &str, duration_minutes: u32) -> ortho_core::Result<MeetingInfo> {
        let meeting = self.meet.create_meeting(summary, duration_minutes).await?;
        Ok(meeting)
    }
}
