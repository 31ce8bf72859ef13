use crate::redux::action::{Action, CallingAction};
use crate::redux::state::CallState;

pub fn reduce(state: CallState, action: &Action) -> CallState {
    let Action::Calling(action) = action else {
        return state;
    };

    match action {
        CallingAction::CallStartRequested => CallState {
            join_requested: true,
            ..state
        },
        CallingAction::StateUpdated(status) => CallState {
            calling_status: *status,
            ..state
        },
        CallingAction::CallIdUpdated(id) => CallState {
            call_id: Some(id.clone()),
            ..state
        },
        CallingAction::CallStartTimeUpdated(time) => CallState {
            call_start_time: Some(*time),
            ..state
        },
        CallingAction::IsRecordingUpdated(on) => CallState {
            is_recording: *on,
            ..state
        },
        CallingAction::IsTranscribingUpdated(on) => CallState {
            is_transcribing: *on,
            ..state
        },
        CallingAction::SetupCall
        | CallingAction::CallEndRequested
        | CallingAction::HoldRequested
        | CallingAction::ResumeRequested => state,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::redux::state::CallingStatus;

    #[test]
    fn test_status_updates() {
        let state = reduce(
            CallState::default(),
            &CallingAction::StateUpdated(CallingStatus::Connecting).into(),
        );
        assert_eq!(state.calling_status, CallingStatus::Connecting);

        let state = reduce(state, &CallingAction::StateUpdated(CallingStatus::Connected).into());
        assert_eq!(state.calling_status, CallingStatus::Connected);
    }

    #[test]
    fn test_call_start_requested_marks_join() {
        let state = reduce(CallState::default(), &CallingAction::CallStartRequested.into());
        assert!(state.join_requested);
        assert_eq!(state.calling_status, CallingStatus::None);
    }
}
