//! Captions and chat reducers.

use crate::redux::action::{Action, CaptionsAction, ChatAction};
use crate::redux::state::{CaptionsState, CaptionsStatus, ChatState};

pub fn reduce_captions(state: CaptionsState, action: &Action) -> CaptionsState {
    let Action::Captions(action) = action else {
        return state;
    };

    match action {
        CaptionsAction::StartRequested { language } => CaptionsState {
            status: CaptionsStatus::Starting,
            spoken_language: Some(language.clone()),
            error: None,
        },
        CaptionsAction::Started { language } => CaptionsState {
            status: CaptionsStatus::On,
            spoken_language: Some(language.clone()),
            ..state
        },
        CaptionsAction::StopRequested => CaptionsState {
            status: CaptionsStatus::Stopping,
            ..state
        },
        CaptionsAction::Stopped => CaptionsState {
            status: CaptionsStatus::Off,
            ..state
        },
        CaptionsAction::Failed(error) => CaptionsState {
            status: CaptionsStatus::Off,
            error: Some(error.clone()),
            ..state
        },
    }
}

pub fn reduce_chat(state: ChatState, action: &Action) -> ChatState {
    let Action::Chat(action) = action else {
        return state;
    };

    match action {
        ChatAction::MessageSent(message) | ChatAction::MessageReceived(message) => {
            // Echoes of our own messages arrive as received messages too
            if state.messages.iter().any(|m| m.id == message.id) {
                return state;
            }
            let mut messages = state.messages.clone();
            messages.push(message.clone());
            let last_send_error = match action {
                ChatAction::MessageSent(_) => None,
                _ => state.last_send_error,
            };
            ChatState {
                messages,
                last_send_error,
            }
        }
        ChatAction::SendMessageFailed(error) => ChatState {
            last_send_error: Some(error.clone()),
            ..state
        },
        ChatAction::SendMessageRequested { .. } => state,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChatMessage;
    use chrono::Utc;

    fn message(id: &str) -> ChatMessage {
        ChatMessage {
            id: id.to_string(),
            sender_id: "me".to_string(),
            sender_display_name: None,
            content: "hello".to_string(),
            created_on: Utc::now(),
        }
    }

    #[test]
    fn test_captions_flow() {
        let state = reduce_captions(
            CaptionsState::default(),
            &CaptionsAction::StartRequested {
                language: "en-us".to_string(),
            }
            .into(),
        );
        assert_eq!(state.status, CaptionsStatus::Starting);

        let state = reduce_captions(
            state,
            &CaptionsAction::Started {
                language: "en-us".to_string(),
            }
            .into(),
        );
        assert_eq!(state.status, CaptionsStatus::On);
        assert_eq!(state.spoken_language.as_deref(), Some("en-us"));
    }

    #[test]
    fn test_duplicate_messages_ignored() {
        let state = reduce_chat(ChatState::default(), &ChatAction::MessageSent(message("1")).into());
        let state = reduce_chat(state, &ChatAction::MessageReceived(message("1")).into());
        let state = reduce_chat(state, &ChatAction::MessageReceived(message("2")).into());

        let ids: Vec<_> = state.messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }
}
