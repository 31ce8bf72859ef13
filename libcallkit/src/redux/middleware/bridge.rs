//! SDK event bridge
//!
//! Forwards SDK events into the store as actions. Runs as its own task for
//! the lifetime of a call; it stops when the SDK closes its event channel or
//! the store is disposed.

use chrono::Utc;
use tokio::sync::broadcast;

use crate::redux::action::{
    Action, CallingAction, ChatAction, ErrorAction, LocalUserAction, ParticipantAction,
};
use crate::redux::state::{AppState, CallingStatus};
use crate::redux::store::Store;
use crate::sdk::SdkEvent;

pub(super) async fn run(store: Store<AppState>, mut events: broadcast::Receiver<SdkEvent>) {
    tracing::debug!("SDK event bridge started");
    let mut connected = false;

    loop {
        let event = match events.recv().await {
            Ok(event) => event,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!("SDK event bridge lagged, skipped {} events", skipped);
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => break,
        };

        if store.is_disposed() {
            break;
        }

        if !connected
            && matches!(
                event,
                SdkEvent::CallStateChanged {
                    status: CallingStatus::Connected,
                    ..
                }
            )
        {
            connected = true;
            store.dispatch(CallingAction::CallStartTimeUpdated(Utc::now()));
        }

        for action in translate(event) {
            store.dispatch(action);
        }
    }

    tracing::debug!("SDK event bridge stopped");
}

fn translate(event: SdkEvent) -> Vec<Action> {
    match event {
        SdkEvent::CallStateChanged { status, error } => {
            let mut actions = vec![CallingAction::StateUpdated(status).into()];
            if let Some(error) = error {
                actions.push(ErrorAction::CallStateErrorOccurred(error).into());
            }
            actions
        }
        SdkEvent::CallIdChanged(id) => vec![CallingAction::CallIdUpdated(id).into()],
        SdkEvent::RecordingChanged(on) => vec![CallingAction::IsRecordingUpdated(on).into()],
        SdkEvent::TranscribingChanged(on) => {
            vec![CallingAction::IsTranscribingUpdated(on).into()]
        }
        SdkEvent::ParticipantsUpdated(map) => vec![ParticipantAction::ListUpdated(map).into()],
        SdkEvent::DominantSpeakersChanged(ids) => {
            vec![ParticipantAction::DominantSpeakersUpdated(ids).into()]
        }
        SdkEvent::CamerasCountChanged(count) => {
            vec![LocalUserAction::CamerasCountUpdated(count).into()]
        }
        SdkEvent::MessageReceived(message) => vec![ChatAction::MessageReceived(message).into()],
    }
}
