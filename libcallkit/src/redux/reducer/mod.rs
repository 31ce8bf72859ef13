//! Pure reducer functions for state transitions
//!
//! The root reducer is a pure function `(AppState, &Action) -> AppState`
//! that hands the action to one reducer per slice and reassembles the
//! results. Slice reducers never read other slices; coordination across
//! slices belongs to middleware.
//!
//! # Purity Guarantees
//!
//! - No SDK or platform calls
//! - No dispatch
//! - No clocks (timestamps arrive inside actions or are counters)
//! - An action a slice does not handle returns that slice unchanged

mod call;
mod conversation;
mod local_user;
mod participants;
mod session;

use super::action::Action;
use super::state::AppState;

pub use call::reduce as reduce_call;
pub use conversation::{reduce_captions, reduce_chat};
pub use local_user::reduce as reduce_local_user;
pub use participants::reduce as reduce_remote_participants;
pub use session::{reduce_error, reduce_lifecycle, reduce_navigation, reduce_permissions};

/// Root reducer
pub fn reduce(state: AppState, action: &Action) -> AppState {
    AppState {
        call: reduce_call(state.call, action),
        local_user: reduce_local_user(state.local_user, action),
        remote_participants: reduce_remote_participants(state.remote_participants, action),
        permissions: reduce_permissions(state.permissions, action),
        lifecycle: reduce_lifecycle(state.lifecycle, action),
        error: reduce_error(state.error, action),
        navigation: reduce_navigation(state.navigation, action),
        captions: reduce_captions(state.captions, action),
        chat: reduce_chat(state.chat, action),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::redux::action::{
        CallingAction, ErrorAction, LocalUserAction, NavigationAction, ParticipantAction,
    };
    use crate::redux::state::{CallingStatus, NavigationStatus};

    fn busy_state() -> AppState {
        let mut state = AppState::default();
        state = reduce(state, &CallingAction::StateUpdated(CallingStatus::Connected).into());
        state = reduce(state, &LocalUserAction::CameraOnSucceeded("s-1".to_string()).into());
        state = reduce(state, &NavigationAction::CallLaunched.into());
        state
    }

    #[test]
    fn test_reducer_is_pure() {
        let state = busy_state();
        let snapshot = state.clone();

        let new_state = reduce(state.clone(), &CallingAction::IsRecordingUpdated(true).into());

        assert!(!state.call.is_recording);
        assert_eq!(state, snapshot);
        assert!(new_state.call.is_recording);
    }

    #[test]
    fn test_request_actions_leave_state_unchanged() {
        // Requests are handled by middleware; no slice reacts to them
        let state = busy_state();
        for action in [
            Action::from(LocalUserAction::CameraOnRequested),
            Action::from(ParticipantAction::FetchRequested),
            Action::from(CallingAction::SetupCall),
        ] {
            assert_eq!(reduce(state.clone(), &action), state, "{}", action.name());
        }
    }

    #[test]
    fn test_slices_are_independent() {
        let state = busy_state();
        let new_state = reduce(
            state.clone(),
            &LocalUserAction::DisplayNameSet("Lin".to_string()).into(),
        );

        assert_eq!(new_state.local_user.display_name.as_deref(), Some("Lin"));
        assert_eq!(new_state.call, state.call);
        assert_eq!(new_state.navigation, state.navigation);
        assert_eq!(new_state.remote_participants, state.remote_participants);
    }

    #[test]
    fn test_emergency_exit_forces_exit() {
        let state = reduce(busy_state(), &ErrorAction::EmergencyExit.into());
        assert_eq!(state.navigation.status, NavigationStatus::Exit);

        // A late launch result does not bring the call UI back
        let state = reduce(state, &NavigationAction::CallLaunched.into());
        assert_eq!(state.navigation.status, NavigationStatus::Exit);
    }
}
