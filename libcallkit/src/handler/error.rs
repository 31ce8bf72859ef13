//! Error surfacing and emergency exit
//!
//! Errors live in state until replaced, so every later state still carries
//! them. The handler remembers the last value seen in each error slot and
//! only reacts when a slot holds a new, non-empty value.

use crate::redux::action::ErrorAction;
use crate::redux::state::AppState;
use crate::redux::store::Store;
use crate::types::{CallCompositeError, CallCompositeEventCode, CallStateError, ErrorCode};

use super::{EventHandlers, StateObserver};

pub struct ErrorHandler {
    store: Store<AppState>,
    handlers: EventHandlers,
    last_fatal: Option<CallCompositeError>,
    last_camera: Option<CallCompositeError>,
    last_mic: Option<CallCompositeError>,
    last_call_state: Option<CallStateError>,
}

impl ErrorHandler {
    pub fn new(store: Store<AppState>, handlers: EventHandlers) -> Self {
        Self {
            store,
            handlers,
            last_fatal: None,
            last_camera: None,
            last_mic: None,
            last_call_state: None,
        }
    }

    /// Decided against the slots as they were before this state
    fn needs_emergency_exit(&self, state: &AppState) -> bool {
        let token_expired = state.error.call_state_error.as_ref().is_some_and(|error| {
            Some(error) != self.last_call_state.as_ref() && error.code == ErrorCode::TokenExpired
        });
        let fatal = state.error.fatal_error.is_some()
            && state.error.fatal_error != self.last_fatal;

        token_expired || fatal
    }

    fn surface_call_state(&mut self, current: &Option<CallStateError>) {
        let Some(error) = current else {
            return;
        };
        if self.last_call_state.as_ref() == Some(error) {
            return;
        }
        self.last_call_state = Some(error.clone());

        match error.event_code {
            Some(CallCompositeEventCode::CallEvicted | CallCompositeEventCode::CallDeclined) => {
                tracing::debug!(code = ?error.code, "Call ended by remote side");
            }
            None => self
                .handlers
                .notify_error(&CallCompositeError::from_code(error.code)),
        }
    }
}

/// A cleared slot keeps the last value, so only a new distinct error is
/// reported.
fn surface(
    handlers: &EventHandlers,
    last: &mut Option<CallCompositeError>,
    current: &Option<CallCompositeError>,
) {
    let Some(error) = current else {
        return;
    };
    if last.as_ref() != Some(error) {
        handlers.notify_error(error);
        *last = Some(error.clone());
    }
}

impl StateObserver for ErrorHandler {
    fn on_state(&mut self, state: &AppState) {
        if self.needs_emergency_exit(state) {
            tracing::warn!("Unrecoverable error, requesting emergency exit");
            self.store.dispatch(ErrorAction::EmergencyExit);
        }

        surface(&self.handlers, &mut self.last_fatal, &state.error.fatal_error);
        surface(&self.handlers, &mut self.last_camera, &state.local_user.camera.error);
        surface(&self.handlers, &mut self.last_mic, &state.local_user.audio.error);
        self.surface_call_state(&state.error.call_state_error);
    }
}
