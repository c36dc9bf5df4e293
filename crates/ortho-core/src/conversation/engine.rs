//! Conversation engine
//!
//! Runs the side effect chosen by [`transition`] against the injected
//! gateways, then applies the session update. Outbound sends are
//! fire-and-forget: a messaging failure is logged and never aborts the
//! turn or the transition.

use std::sync::Arc;

use tracing::{info, warn};

use crate::conversation::machine::{Effect, transition};
use crate::conversation::InboundEvent;
use crate::error::Result;
use crate::gateway::{
    AiGateway, Button, ListRow, ListSection, MeetingGateway, MeetingInfo, MeetingPlatform,
    MessagingGateway, PatientDirectoryGateway,
};
use crate::session::{Session, SessionStore};

/// Fixed reply when the AI assistant is unavailable
pub const FALLBACK_ANSWER: &str = "Disculpa, no puedo procesar tu consulta en este momento.";

const WELCOME_MESSAGE: &str = "¡Bienvenido al Sistema de Ortopedia! 🏥\n\n\
    Para comenzar, ingresa tu número de cédula:";

const DOCTOR_CHAT_PROMPT: &str =
    "💬 *Consulta con Doctor Virtual*\n\nHazme cualquier pregunta sobre ortopedia.";

/// Executes conversation turns against the external gateways.
pub struct ConversationEngine {
    store: Arc<dyn SessionStore>,
    messaging: Arc<dyn MessagingGateway>,
    directory: Arc<dyn PatientDirectoryGateway>,
    meetings: Arc<dyn MeetingGateway>,
    ai: Arc<dyn AiGateway>,
}

impl ConversationEngine {
    pub fn new(
        store: Arc<dyn SessionStore>,
        messaging: Arc<dyn MessagingGateway>,
        directory: Arc<dyn PatientDirectoryGateway>,
        meetings: Arc<dyn MeetingGateway>,
        ai: Arc<dyn AiGateway>,
    ) -> Self {
        Self {
            store,
            messaging,
            directory,
            meetings,
            ai,
        }
    }

    /// Process one classified inbound event to completion.
    pub async fn handle(&self, event: InboundEvent) -> Result<()> {
        let session = self.store.get_or_create(&event.sender).await?;
        let step = transition(session.state, &event.kind);

        info!(
            sender = %event.sender,
            state = session.state.as_str(),
            effect = ?step.effect,
            "dispatching inbound event"
        );

        self.run_effect(&event.sender, &session, &step.effect).await;

        if step.next.is_some() {
            self.store.update(&event.sender, step.next, None).await?;
        }
        Ok(())
    }

    /// Answer a free-text medical question, degrading to the fixed apology
    /// when the AI gateway fails.
    ///
    /// Not yet reachable from the transition table: `DoctorChat` is entered
    /// but consumes no input yet.
    pub async fn answer_medical_question(&self, question: &str) -> String {
        match self.ai.ask(question).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!("AI gateway failed: {}", e);
                FALLBACK_ANSWER.to_string()
            }
        }
    }

    async fn run_effect(&self, sender: &str, session: &Session, effect: &Effect) {
        match effect {
            Effect::ShowMainMenu => {
                self.send_list(
                    sender,
                    "Selecciona el servicio que necesitas:",
                    "Ver opciones",
                    &main_menu_sections(),
                )
                .await;
            }
            Effect::SendWelcome => {
                self.send_text(sender, WELCOME_MESSAGE).await;
            }
            Effect::ShowConsultasMenu => {
                self.send_buttons(
                    sender,
                    "¿Qué necesitas en el área de consultas?",
                    &consultas_buttons(),
                )
                .await;
            }
            Effect::PromptDoctorChat => {
                self.send_text(sender, DOCTOR_CHAT_PROMPT).await;
            }
            Effect::ShowPlatformChoice => {
                self.send_buttons(
                    sender,
                    "Selecciona la plataforma para tu videollamada:",
                    &platform_buttons(),
                )
                .await;
            }
            Effect::CreateMeeting(platform) => {
                self.create_meeting(sender, session, *platform).await;
            }
            Effect::None => {}
        }
    }

    /// Create a video conference room and report the outcome to the user.
    ///
    /// On failure: one fixed support message, no persistence, no state
    /// change. On success: one formatted message, then one persistence call
    /// with the session's `patient_id` (absent is forwarded as null).
    async fn create_meeting(&self, sender: &str, session: &Session, platform: MeetingPlatform) {
        let patient_name = session
            .data
            .get("nombre")
            .map(String::as_str)
            .unwrap_or("Paciente");
        let topic = format!("Consulta Ortopedia - {}", patient_name);

        self.send_text(sender, creating_room_notice(platform)).await;

        let result = match platform {
            MeetingPlatform::Zoom => self.meetings.create_zoom(&topic, 30).await,
            MeetingPlatform::GoogleMeet => self.meetings.create_meet(&topic, 30).await,
        };

        let meeting = match result {
            Ok(meeting) => meeting,
            Err(e) => {
                warn!(platform = platform.as_str(), "meeting creation failed: {}", e);
                self.send_text(sender, creation_failed_message(platform)).await;
                return;
            }
        };

        self.send_text(sender, &meeting_created_message(&meeting)).await;

        let patient_id = session.data.get("patient_id").map(String::as_str);
        if let Err(e) = self
            .directory
            .save_meeting(patient_id, platform, &meeting.join_url, &meeting.meeting_id)
            .await
        {
            // The user already has a working link; only log the miss.
            warn!("failed to persist video call record: {}", e);
        }
    }

    async fn send_text(&self, to: &str, body: &str) {
        if let Err(e) = self.messaging.send_text(to, body).await {
            warn!(to, "failed to send text message: {}", e);
        }
    }

    async fn send_buttons(&self, to: &str, body: &str, buttons: &[Button]) {
        if let Err(e) = self.messaging.send_buttons(to, body, buttons).await {
            warn!(to, "failed to send button message: {}", e);
        }
    }

    async fn send_list(&self, to: &str, body: &str, label: &str, sections: &[ListSection]) {
        if let Err(e) = self.messaging.send_list(to, body, label, sections).await {
            warn!(to, "failed to send list message: {}", e);
        }
    }
}

fn main_menu_sections() -> Vec<ListSection> {
    vec![ListSection {
        title: "Servicios Disponibles".to_string(),
        rows: vec![
            ListRow {
                id: "consultas".to_string(),
                title: "📋 Manejo de Consultas".to_string(),
                description: "Consultas médicas y envío de estudios".to_string(),
            },
            ListRow {
                id: "citas".to_string(),
                title: "📅 Agendar Citas".to_string(),
                description: "Ver y agendar citas disponibles".to_string(),
            },
            ListRow {
                id: "telefonos".to_string(),
                title: "📞 Teléfonos de Atención".to_string(),
                description: "Información de contacto".to_string(),
            },
        ],
    }]
}

fn consultas_buttons() -> Vec<Button> {
    vec![
        Button::new("consulta_doctor", "💬 Consultar Doctor"),
        Button::new("enviar_estudio", "📤 Enviar Estudio"),
        Button::new("videollamada", "📹 Videollamada"),
    ]
}

fn platform_buttons() -> Vec<Button> {
    vec![
        Button::new("video_zoom", "📹 Zoom"),
        Button::new("video_meet", "🎥 Google Meet"),
    ]
}

fn creating_room_notice(platform: MeetingPlatform) -> &'static str {
    match platform {
        MeetingPlatform::Zoom => "📹 Creando tu sala de Zoom...",
        MeetingPlatform::GoogleMeet => "🎥 Creando tu sala de Google Meet...",
    }
}

fn creation_failed_message(platform: MeetingPlatform) -> &'static str {
    match platform {
        MeetingPlatform::Zoom => {
            "❌ No pudimos crear la videollamada de Zoom. Contacta con soporte."
        }
        MeetingPlatform::GoogleMeet => {
            "❌ No pudimos crear la videollamada de Google Meet. Contacta con soporte."
        }
    }
}

fn meeting_created_message(meeting: &MeetingInfo) -> String {
    match meeting.platform {
        MeetingPlatform::Zoom => format!(
            "✅ *Videollamada Zoom Creada*\n\n\
             📅 Hora: {}\n\
             🔢 ID de reunión: {}\n\
             🔐 Contraseña: {}\n\n\
             🔗 Enlace directo:\n{}\n\n\
             💡 Puedes unirte 5 minutos antes de la hora programada.",
            meeting.start_time,
            meeting.meeting_id,
            meeting.password.as_deref().unwrap_or("Sin contraseña"),
            meeting.join_url,
        ),
        MeetingPlatform::GoogleMeet => format!(
            "✅ *Videollamada Google Meet Creada*\n\n\
             📅 Hora: {}\n\n\
             🔗 Enlace de la reunión:\n{}\n\n\
             💡 Puedes unirte en cualquier momento usando el enlace.",
            meeting.start_time, meeting.join_url,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::error::Error;
    use crate::gateway::{Appointment, ContactPhone, PatientRecord};
    use crate::session::{ConversationState, MemorySessionStore};

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Sent {
        Text { to: String, body: String },
        Buttons { to: String, ids: Vec<String> },
        List { to: String, row_ids: Vec<String> },
    }

    #[derive(Default)]
    struct RecordingMessaging {
        sent: Mutex<Vec<Sent>>,
    }

    impl RecordingMessaging {
        fn sent(&self) -> Vec<Sent> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MessagingGateway for RecordingMessaging {
        async fn send_text(&self, to: &str, body: &str) -> Result<()> {
            self.sent.lock().unwrap().push(Sent::Text {
                to: to.to_string(),
                body: body.to_string(),
            });
            Ok(())
        }

        async fn send_buttons(&self, to: &str, _body: &str, buttons: &[Button]) -> Result<()> {
            self.sent.lock().unwrap().push(Sent::Buttons {
                to: to.to_string(),
                ids: buttons.iter().map(|b| b.id.clone()).collect(),
            });
            Ok(())
        }

        async fn send_list(
            &self,
            to: &str,
            _body: &str,
            _label: &str,
            sections: &[ListSection],
        ) -> Result<()> {
            self.sent.lock().unwrap().push(Sent::List {
                to: to.to_string(),
                row_ids: sections
                    .iter()
                    .flat_map(|s| s.rows.iter().map(|r| r.id.clone()))
                    .collect(),
            });
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingDirectory {
        saved_meetings: Mutex<Vec<(Option<String>, String, String, String)>>,
    }

    #[async_trait]
    impl PatientDirectoryGateway for RecordingDirectory {
        async fn lookup(&self, _cedula: &str) -> Result<Option<PatientRecord>> {
            Ok(None)
        }

        async fn create(
            &self,
            cedula: &str,
            nombre: &str,
            apellidos: &str,
        ) -> Result<PatientRecord> {
            Ok(PatientRecord {
                id: Some("1".to_string()),
                cedula: cedula.to_string(),
                nombre: nombre.to_string(),
                apellidos: apellidos.to_string(),
            })
        }

        async fn available_appointments(&self) -> Result<Vec<Appointment>> {
            Ok(Vec::new())
        }

        async fn contact_phones(&self) -> Result<Vec<ContactPhone>> {
            Ok(Vec::new())
        }

        async fn save_study(&self, _: &str, _: &str, _: &str) -> Result<()> {
            Ok(())
        }

        async fn save_meeting(
            &self,
            patient_id: Option<&str>,
            platform: MeetingPlatform,
            url: &str,
            meeting_id: &str,
        ) -> Result<()> {
            self.saved_meetings.lock().unwrap().push((
                patient_id.map(str::to_string),
                platform.as_str().to_string(),
                url.to_string(),
                meeting_id.to_string(),
            ));
            Ok(())
        }
    }

    struct StubMeetings {
        result: Option<MeetingInfo>,
    }

    #[async_trait]
    impl MeetingGateway for StubMeetings {
        async fn create_zoom(&self, _topic: &str, _duration: u32) -> Result<MeetingInfo> {
            self.result
                .clone()
                .ok_or_else(|| Error::Meeting("zoom unavailable".to_string()))
        }

        async fn create_meet(&self, _summary: &str, _duration: u32) -> Result<MeetingInfo> {
            self.result
                .clone()
                .ok_or_else(|| Error::Meeting("meet unavailable".to_string()))
        }
    }

    struct StubAi {
        answer: Option<String>,
    }

    #[async_trait]
    impl AiGateway for StubAi {
        async fn ask(&self, _question: &str) -> Result<String> {
            self.answer
                .clone()
                .ok_or_else(|| Error::Ai("ai unavailable".to_string()))
        }
    }

    struct Harness {
        engine: ConversationEngine,
        store: Arc<MemorySessionStore>,
        messaging: Arc<RecordingMessaging>,
        directory: Arc<RecordingDirectory>,
    }

    fn harness(meeting: Option<MeetingInfo>, ai_answer: Option<String>) -> Harness {
        let store = Arc::new(MemorySessionStore::new());
        let messaging = Arc::new(RecordingMessaging::default());
        let directory = Arc::new(RecordingDirectory::default());
        let engine = ConversationEngine::new(
            store.clone(),
            messaging.clone(),
            directory.clone(),
            Arc::new(StubMeetings { result: meeting }),
            Arc::new(StubAi { answer: ai_answer }),
        );
        Harness {
            engine,
            store,
            messaging,
            directory,
        }
    }

    fn zoom_meeting() -> MeetingInfo {
        MeetingInfo {
            platform: MeetingPlatform::Zoom,
            join_url: "https://zoom.us/j/999".to_string(),
            meeting_id: "999".to_string(),
            password: Some("abc".to_string()),
            start_time: "2025-01-01T10:00:00".to_string(),
        }
    }

    async fn state_of(h: &Harness, phone: &str) -> ConversationState {
        h.store.get_or_create(phone).await.unwrap().state
    }

    #[tokio::test]
    async fn test_first_text_sends_welcome_and_awaits_cedula() {
        let h = harness(None, None);
        h.engine
            .handle(InboundEvent::text("+57300", "hola"))
            .await
            .unwrap();

        assert_eq!(state_of(&h, "+57300").await, ConversationState::AwaitingCedula);
        let sent = h.messaging.sent();
        assert_eq!(sent.len(), 1);
        assert!(matches!(
            &sent[0],
            Sent::Text { body, .. } if body.contains("Bienvenido")
        ));
    }

    #[tokio::test]
    async fn test_repeat_text_in_awaiting_cedula_is_absorbed() {
        let h = harness(None, None);
        h.engine
            .handle(InboundEvent::text("+57300", "123456"))
            .await
            .unwrap();
        h.engine
            .handle(InboundEvent::text("+57300", "123456"))
            .await
            .unwrap();

        // State unchanged, exactly one welcome message
        assert_eq!(state_of(&h, "+57300").await, ConversationState::AwaitingCedula);
        assert_eq!(h.messaging.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_menu_keyword_from_any_state() {
        let h = harness(None, None);
        // Drive the session out of Initial first
        h.engine
            .handle(InboundEvent::text("+57300", "hola"))
            .await
            .unwrap();

        h.engine
            .handle(InboundEvent::text("+57300", "menú"))
            .await
            .unwrap();

        assert_eq!(state_of(&h, "+57300").await, ConversationState::MainMenu);
        let sent = h.messaging.sent();
        let lists: Vec<_> = sent
            .iter()
            .filter(|s| matches!(s, Sent::List { .. }))
            .collect();
        assert_eq!(lists.len(), 1);
        assert!(matches!(
            lists[0],
            Sent::List { row_ids, .. }
                if row_ids == &["consultas", "citas", "telefonos"]
        ));
    }

    #[tokio::test]
    async fn test_consultas_selection_shows_submenu() {
        let h = harness(None, None);
        h.engine
            .handle(InboundEvent::list("+57300", "consultas"))
            .await
            .unwrap();

        assert_eq!(state_of(&h, "+57300").await, ConversationState::ConsultasMenu);
        assert!(matches!(
            &h.messaging.sent()[0],
            Sent::Buttons { ids, .. }
                if ids == &["consulta_doctor", "enviar_estudio", "videollamada"]
        ));
    }

    #[tokio::test]
    async fn test_videollamada_shows_platform_choice() {
        let h = harness(None, None);
        h.engine
            .handle(InboundEvent::button("+57300", "videollamada"))
            .await
            .unwrap();

        assert_eq!(
            state_of(&h, "+57300").await,
            ConversationState::SelectingVideoPlatform
        );
        assert!(matches!(
            &h.messaging.sent()[0],
            Sent::Buttons { ids, .. } if ids == &["video_zoom", "video_meet"]
        ));
    }

    #[tokio::test]
    async fn test_zoom_failure_sends_support_message_and_skips_persistence() {
        let h = harness(None, None);
        h.engine
            .handle(InboundEvent::button("+57300", "video_zoom"))
            .await
            .unwrap();

        // No state change
        assert_eq!(state_of(&h, "+57300").await, ConversationState::Initial);

        let sent = h.messaging.sent();
        assert_eq!(sent.len(), 2); // "creating" notice + failure message
        assert!(matches!(
            &sent[1],
            Sent::Text { body, .. } if body.contains("Contacta con soporte")
        ));
        assert!(h.directory.saved_meetings.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_zoom_success_sends_link_and_persists_record() {
        let h = harness(Some(zoom_meeting()), None);
        h.store
            .update(
                "+57300",
                None,
                Some(HashMap::from([
                    ("nombre".to_string(), "Ana".to_string()),
                    ("patient_id".to_string(), "42".to_string()),
                ])),
            )
            .await
            .unwrap();

        h.engine
            .handle(InboundEvent::button("+57300", "video_zoom"))
            .await
            .unwrap();

        let sent = h.messaging.sent();
        assert_eq!(sent.len(), 2);
        let Sent::Text { body, .. } = &sent[1] else {
            panic!("expected text message");
        };
        assert!(body.contains("https://zoom.us/j/999"));
        assert!(body.contains("Contraseña: abc"));
        assert!(body.contains("ID de reunión: 999"));

        let saved = h.directory.saved_meetings.lock().unwrap().clone();
        assert_eq!(
            saved,
            vec![(
                Some("42".to_string()),
                "zoom".to_string(),
                "https://zoom.us/j/999".to_string(),
                "999".to_string(),
            )]
        );
    }

    #[tokio::test]
    async fn test_meeting_persisted_with_null_patient_id_when_absent() {
        let h = harness(Some(zoom_meeting()), None);
        h.engine
            .handle(InboundEvent::button("+57300", "video_zoom"))
            .await
            .unwrap();

        let saved = h.directory.saved_meetings.lock().unwrap().clone();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].0, None);
    }

    #[tokio::test]
    async fn test_meet_success_message_has_no_password_line() {
        let meet = MeetingInfo {
            platform: MeetingPlatform::GoogleMeet,
            join_url: "https://meet.google.com/abc-defg-hij".to_string(),
            meeting_id: "evt_1".to_string(),
            password: None,
            start_time: "2025-01-01T10:00:00-05:00".to_string(),
        };
        let h = harness(Some(meet), None);
        h.engine
            .handle(InboundEvent::button("+57300", "video_meet"))
            .await
            .unwrap();

        let sent = h.messaging.sent();
        let Sent::Text { body, .. } = &sent[1] else {
            panic!("expected text message");
        };
        assert!(body.contains("meet.google.com"));
        assert!(!body.contains("Contraseña"));

        let saved = h.directory.saved_meetings.lock().unwrap().clone();
        assert_eq!(saved[0].1, "google_meet");
    }

    #[tokio::test]
    async fn test_unknown_button_is_fully_absorbed() {
        let h = harness(None, None);
        h.engine
            .handle(InboundEvent::button("+57300", "enviar_estudio"))
            .await
            .unwrap();

        assert!(h.messaging.sent().is_empty());
        assert_eq!(state_of(&h, "+57300").await, ConversationState::Initial);
    }

    #[tokio::test]
    async fn test_answer_medical_question_degrades_to_apology() {
        let h = harness(None, Some("Reposo y hielo.".to_string()));
        assert_eq!(
            h.engine.answer_medical_question("¿esguince?").await,
            "Reposo y hielo."
        );

        let h = harness(None, None);
        assert_eq!(
            h.engine.answer_medical_question("¿esguince?").await,
            FALLBACK_ANSWER
        );
    }
}
