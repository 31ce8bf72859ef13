//! Remote participant join/leave notifications
//!
//! The roster's `modified_timestamp` changes exactly when the roster
//! does, so the notifier only diffs membership when it moves. The first
//! state observed reports everyone present as joined.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::config::JoinNotification;
use crate::persona::ParticipantViewDataCache;
use crate::redux::state::AppState;
use crate::sdk::ParticipantDirectory;

use super::{EventHandlers, RemoteParticipantJoinedEvent, StateObserver};

pub struct RemoteParticipantNotifier {
    handlers: EventHandlers,
    directory: Arc<dyn ParticipantDirectory>,
    view_data: ParticipantViewDataCache,
    mode: JoinNotification,
    last_timestamp: Option<u64>,
    known: BTreeSet<String>,
}

impl RemoteParticipantNotifier {
    pub fn new(
        handlers: EventHandlers,
        directory: Arc<dyn ParticipantDirectory>,
        view_data: ParticipantViewDataCache,
        mode: JoinNotification,
    ) -> Self {
        Self {
            handlers,
            directory,
            view_data,
            mode,
            last_timestamp: None,
            known: BTreeSet::new(),
        }
    }

    fn notify_joined(&self, joined: &[&String]) {
        let identifiers: Vec<_> = joined
            .iter()
            .filter_map(|id| {
                let identifier = self.directory.identifier(id);
                if identifier.is_none() {
                    tracing::debug!(participant = id.as_str(), "Joined participant not in directory");
                }
                identifier
            })
            .collect();

        if identifiers.is_empty() {
            return;
        }

        match self.mode {
            JoinNotification::Batched => {
                self.handlers
                    .notify_remote_participant_joined(&RemoteParticipantJoinedEvent { identifiers });
            }
            JoinNotification::PerParticipant => {
                for identifier in identifiers {
                    self.handlers
                        .notify_remote_participant_joined(&RemoteParticipantJoinedEvent {
                            identifiers: vec![identifier],
                        });
                }
            }
        }
    }
}

impl StateObserver for RemoteParticipantNotifier {
    fn on_state(&mut self, state: &AppState) {
        let participants = &state.remote_participants;
        if self.last_timestamp == Some(participants.modified_timestamp) {
            return;
        }
        self.last_timestamp = Some(participants.modified_timestamp);

        let current: BTreeSet<String> = participants.participant_map.keys().cloned().collect();

        for left in self.known.difference(&current) {
            self.view_data.remove_participant_view_data(left);
        }

        let joined: Vec<&String> = current.difference(&self.known).collect();
        if !joined.is_empty() {
            self.notify_joined(&joined);
        }

        self.known = current;
    }
}
