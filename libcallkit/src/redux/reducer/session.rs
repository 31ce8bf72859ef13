//! Reducers for the session bookkeeping slices: permissions, lifecycle,
//! errors and navigation.

use crate::redux::action::{
    Action, ErrorAction, LifecycleAction, NavigationAction, PermissionAction,
};
use crate::redux::state::{
    ErrorState, LifecycleState, LifecycleStatus, NavigationState, NavigationStatus,
    PermissionState,
};

pub fn reduce_permissions(state: PermissionState, action: &Action) -> PermissionState {
    match action {
        Action::Permission(PermissionAction::AudioPermissionSet(status)) => PermissionState {
            audio: *status,
            ..state
        },
        Action::Permission(PermissionAction::CameraPermissionSet(status)) => PermissionState {
            camera: *status,
            ..state
        },
        _ => state,
    }
}

pub fn reduce_lifecycle(state: LifecycleState, action: &Action) -> LifecycleState {
    match action {
        Action::Lifecycle(LifecycleAction::EnterForegroundSucceeded) => LifecycleState {
            status: LifecycleStatus::Foreground,
        },
        Action::Lifecycle(LifecycleAction::EnterBackgroundSucceeded) => LifecycleState {
            status: LifecycleStatus::Background,
        },
        _ => state,
    }
}

pub fn reduce_error(state: ErrorState, action: &Action) -> ErrorState {
    match action {
        Action::Error(ErrorAction::FatalErrorOccurred(error)) => ErrorState {
            fatal_error: Some(error.clone()),
            ..state
        },
        Action::Error(ErrorAction::CallStateErrorOccurred(error)) => ErrorState {
            call_state_error: Some(error.clone()),
            ..state
        },
        _ => state,
    }
}

/// Exit is terminal: once reached, no later action navigates back.
pub fn reduce_navigation(state: NavigationState, action: &Action) -> NavigationState {
    if state.status == NavigationStatus::Exit {
        return state;
    }

    let status = match action {
        Action::Navigation(NavigationAction::SetupLaunched) => NavigationStatus::Setup,
        Action::Navigation(NavigationAction::CallLaunched) => NavigationStatus::InCall,
        Action::Navigation(NavigationAction::Exit) | Action::Error(ErrorAction::EmergencyExit) => {
            NavigationStatus::Exit
        }
        _ => return state,
    };

    NavigationState { status }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::redux::state::PermissionStatus;
    use crate::types::{CallCompositeEventCode, CallStateError, ErrorCode};

    #[test]
    fn test_permissions() {
        let state = reduce_permissions(
            PermissionState::default(),
            &PermissionAction::CameraPermissionSet(PermissionStatus::Denied).into(),
        );
        assert_eq!(state.camera, PermissionStatus::Denied);
        assert_eq!(state.audio, PermissionStatus::Unknown);
    }

    #[test]
    fn test_lifecycle_only_moves_on_success() {
        let state = reduce_lifecycle(
            LifecycleState::default(),
            &LifecycleAction::EnterBackgroundTriggered.into(),
        );
        assert_eq!(state.status, LifecycleStatus::Foreground);

        let state = reduce_lifecycle(state, &LifecycleAction::EnterBackgroundSucceeded.into());
        assert_eq!(state.status, LifecycleStatus::Background);
    }

    #[test]
    fn test_call_state_error_recorded() {
        let error = CallStateError::with_event(
            ErrorCode::CallDeclined,
            CallCompositeEventCode::CallDeclined,
        );
        let state = reduce_error(
            ErrorState::default(),
            &ErrorAction::CallStateErrorOccurred(error.clone()).into(),
        );
        assert_eq!(state.call_state_error, Some(error));
        assert!(state.fatal_error.is_none());
    }

    #[test]
    fn test_navigation_sequence() {
        let state = reduce_navigation(
            NavigationState::default(),
            &NavigationAction::SetupLaunched.into(),
        );
        assert_eq!(state.status, NavigationStatus::Setup);

        let state = reduce_navigation(state, &NavigationAction::CallLaunched.into());
        assert_eq!(state.status, NavigationStatus::InCall);

        let state = reduce_navigation(state, &NavigationAction::Exit.into());
        assert_eq!(state.status, NavigationStatus::Exit);

        let state = reduce_navigation(state, &NavigationAction::SetupLaunched.into());
        assert_eq!(state.status, NavigationStatus::Exit);
    }
}
