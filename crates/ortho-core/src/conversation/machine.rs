//! Conversation transition table
//!
//! The whole decision surface is a flat lookup on
//! `(state, input kind, input value)`. Unmatched combinations are an
//! explicit no-op, not an error.

use crate::conversation::EventKind;
use crate::gateway::MeetingPlatform;
use crate::session::ConversationState;

/// Text keywords that interrupt any state and show the main menu
const MENU_KEYWORDS: [&str; 3] = ["menu", "menú", "inicio"];

/// Side effect requested by a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send the service list (consultas / citas / teléfonos)
    ShowMainMenu,
    /// Send the welcome text and prompt for the cedula
    SendWelcome,
    /// Send the consultation sub-menu buttons
    ShowConsultasMenu,
    /// Send the "ask me anything" doctor-chat prompt
    PromptDoctorChat,
    /// Send the Zoom / Google Meet platform choice
    ShowPlatformChoice,
    /// Create a video conference room and report the result
    CreateMeeting(MeetingPlatform),
    /// Nothing to do
    None,
}

/// Result of one transition: the state to move to (if any) and the side
/// effect to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub next: Option<ConversationState>,
    pub effect: Effect,
}

impl Step {
    fn go(next: ConversationState, effect: Effect) -> Self {
        Self {
            next: Some(next),
            effect,
        }
    }

    fn stay(effect: Effect) -> Self {
        Self { next: None, effect }
    }

    fn noop() -> Self {
        Self {
            next: None,
            effect: Effect::None,
        }
    }
}

/// Compute the transition for one inbound event.
///
/// Pure function: session mutation and gateway calls happen in the engine.
pub fn transition(state: ConversationState, kind: &EventKind) -> Step {
    match kind {
        EventKind::Text(text) => {
            if MENU_KEYWORDS.contains(&text.as_str()) {
                return Step::go(ConversationState::MainMenu, Effect::ShowMainMenu);
            }
            if state == ConversationState::Initial {
                return Step::go(ConversationState::AwaitingCedula, Effect::SendWelcome);
            }
            // AwaitingCedula, DoctorChat and the menus define no text
            // handler yet; the message is absorbed without a transition.
            Step::noop()
        }
        EventKind::ListReply(id) => match id.as_str() {
            "consultas" => Step::go(ConversationState::ConsultasMenu, Effect::ShowConsultasMenu),
            _ => Step::noop(),
        },
        EventKind::ButtonReply(id) => match id.as_str() {
            "consulta_doctor" => {
                Step::go(ConversationState::DoctorChat, Effect::PromptDoctorChat)
            }
            "videollamada" => Step::go(
                ConversationState::SelectingVideoPlatform,
                Effect::ShowPlatformChoice,
            ),
            "video_zoom" => Step::stay(Effect::CreateMeeting(MeetingPlatform::Zoom)),
            "video_meet" => Step::stay(Effect::CreateMeeting(MeetingPlatform::GoogleMeet)),
            _ => Step::noop(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(body: &str) -> EventKind {
        EventKind::Text(body.to_string())
    }

    #[test]
    fn test_menu_keyword_from_any_state() {
        for state in ConversationState::ALL {
            for keyword in ["menu", "menú", "inicio"] {
                let step = transition(state, &text(keyword));
                assert_eq!(step.next, Some(ConversationState::MainMenu));
                assert_eq!(step.effect, Effect::ShowMainMenu);
            }
        }
    }

    #[test]
    fn test_initial_text_sends_welcome() {
        let step = transition(ConversationState::Initial, &text("hola"));
        assert_eq!(step.next, Some(ConversationState::AwaitingCedula));
        assert_eq!(step.effect, Effect::SendWelcome);
    }

    #[test]
    fn test_text_outside_initial_is_noop() {
        for state in ConversationState::ALL {
            if state == ConversationState::Initial {
                continue;
            }
            let step = transition(state, &text("123456789"));
            assert_eq!(step.next, None, "state {:?}", state);
            assert_eq!(step.effect, Effect::None);
        }
    }

    #[test]
    fn test_consultas_list_selection() {
        let step = transition(
            ConversationState::MainMenu,
            &EventKind::ListReply("consultas".to_string()),
        );
        assert_eq!(step.next, Some(ConversationState::ConsultasMenu));
        assert_eq!(step.effect, Effect::ShowConsultasMenu);
    }

    #[test]
    fn test_unknown_list_selection_is_noop() {
        // "citas" and "telefonos" appear in the menu but have no handler yet
        for id in ["citas", "telefonos", "otro"] {
            let step = transition(
                ConversationState::MainMenu,
                &EventKind::ListReply(id.to_string()),
            );
            assert_eq!(step, Step::noop());
        }
    }

    #[test]
    fn test_doctor_chat_button() {
        let step = transition(
            ConversationState::ConsultasMenu,
            &EventKind::ButtonReply("consulta_doctor".to_string()),
        );
        assert_eq!(step.next, Some(ConversationState::DoctorChat));
        assert_eq!(step.effect, Effect::PromptDoctorChat);
    }

    #[test]
    fn test_video_call_button() {
        let step = transition(
            ConversationState::ConsultasMenu,
            &EventKind::ButtonReply("videollamada".to_string()),
        );
        assert_eq!(step.next, Some(ConversationState::SelectingVideoPlatform));
        assert_eq!(step.effect, Effect::ShowPlatformChoice);
    }

    #[test]
    fn test_platform_buttons_keep_state() {
        for state in ConversationState::ALL {
            let step = transition(state, &EventKind::ButtonReply("video_zoom".to_string()));
            assert_eq!(step.next, None);
            assert_eq!(step.effect, Effect::CreateMeeting(MeetingPlatform::Zoom));

            let step = transition(state, &EventKind::ButtonReply("video_meet".to_string()));
            assert_eq!(step.next, None);
            assert_eq!(
                step.effect,
                Effect::CreateMeeting(MeetingPlatform::GoogleMeet)
            );
        }
    }

    #[test]
    fn test_unknown_button_is_noop() {
        // "enviar_estudio" is offered in the sub-menu but not handled yet
        let step = transition(
            ConversationState::ConsultasMenu,
            &EventKind::ButtonReply("enviar_estudio".to_string()),
        );
        assert_eq!(step, Step::noop());
    }
}
