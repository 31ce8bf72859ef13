use crate::redux::action::{Action, LocalUserAction};
use crate::redux::state::{
    AudioOperationalStatus, AudioState, BluetoothState, CameraDeviceSelectionStatus,
    CameraOperationalStatus, CameraState, LocalUserState,
};

pub fn reduce(state: LocalUserState, action: &Action) -> LocalUserState {
    let Action::LocalUser(action) = action else {
        return state;
    };

    match action {
        // === Camera ===
        LocalUserAction::CameraPreviewOnTriggered
        | LocalUserAction::CameraOnTriggered
        | LocalUserAction::CameraOffTriggered => LocalUserState {
            camera: CameraState {
                operation: CameraOperationalStatus::Pending,
                ..state.camera
            },
            ..state
        },

        LocalUserAction::CameraPreviewOnSucceeded(stream_id)
        | LocalUserAction::CameraOnSucceeded(stream_id) => LocalUserState {
            camera: CameraState {
                operation: CameraOperationalStatus::On,
                error: None,
                ..state.camera
            },
            video_stream_id: Some(stream_id.clone()),
            ..state
        },

        LocalUserAction::CameraPreviewOnFailed(error) | LocalUserAction::CameraOnFailed(error) => {
            LocalUserState {
                camera: CameraState {
                    operation: CameraOperationalStatus::Off,
                    error: Some(error.clone()),
                    ..state.camera
                },
                video_stream_id: None,
                ..state
            }
        }

        LocalUserAction::CameraOffSucceeded => LocalUserState {
            camera: CameraState {
                operation: CameraOperationalStatus::Off,
                error: None,
                ..state.camera
            },
            video_stream_id: None,
            ..state
        },

        // The camera is still running
        LocalUserAction::CameraOffFailed(error) => LocalUserState {
            camera: CameraState {
                operation: CameraOperationalStatus::On,
                error: Some(error.clone()),
                ..state.camera
            },
            ..state
        },

        LocalUserAction::CameraPauseSucceeded => LocalUserState {
            camera: CameraState {
                operation: CameraOperationalStatus::Paused,
                ..state.camera
            },
            video_stream_id: None,
            ..state
        },

        LocalUserAction::CameraSwitchTriggered => LocalUserState {
            camera: CameraState {
                device: CameraDeviceSelectionStatus::Switching,
                ..state.camera
            },
            ..state
        },

        LocalUserAction::CameraSwitchSucceeded(device) => LocalUserState {
            camera: CameraState {
                device: *device,
                error: None,
                ..state.camera
            },
            ..state
        },

        LocalUserAction::CameraSwitchFailed { previous, error } => LocalUserState {
            camera: CameraState {
                device: *previous,
                error: Some(error.clone()),
                ..state.camera
            },
            ..state
        },

        LocalUserAction::CamerasCountUpdated(count) => LocalUserState {
            camera: CameraState {
                cameras_count: *count,
                ..state.camera
            },
            ..state
        },

        // === Microphone ===
        LocalUserAction::MicOnTriggered | LocalUserAction::MicOffTriggered => LocalUserState {
            audio: AudioState {
                operation: AudioOperationalStatus::Pending,
                ..state.audio
            },
            ..state
        },

        LocalUserAction::MicOnSucceeded => with_mic(state, AudioOperationalStatus::On, None),
        LocalUserAction::MicOffSucceeded => with_mic(state, AudioOperationalStatus::Off, None),
        LocalUserAction::MicOnFailed(error) => {
            with_mic(state, AudioOperationalStatus::Off, Some(error.clone()))
        }
        LocalUserAction::MicOffFailed(error) => {
            with_mic(state, AudioOperationalStatus::On, Some(error.clone()))
        }

        // === Audio routing ===
        LocalUserAction::AudioDeviceChangeRequested(device) => LocalUserState {
            audio: AudioState {
                device: device.requested(),
                ..state.audio
            },
            ..state
        },

        LocalUserAction::AudioDeviceChangeSucceeded(device) => LocalUserState {
            audio: AudioState {
                device: device.selected(),
                error: None,
                ..state.audio
            },
            ..state
        },

        LocalUserAction::AudioDeviceChangeFailed { previous, error } => LocalUserState {
            audio: AudioState {
                device: previous.selected(),
                error: Some(error.clone()),
                ..state.audio
            },
            ..state
        },

        LocalUserAction::AudioDeviceBluetoothScoAvailable {
            available,
            device_name,
        } => LocalUserState {
            audio: AudioState {
                bluetooth: BluetoothState {
                    available: *available,
                    device_name: device_name.clone(),
                },
                ..state.audio
            },
            ..state
        },

        LocalUserAction::DisplayNameSet(name) => LocalUserState {
            display_name: Some(name.clone()),
            ..state
        },

        LocalUserAction::CameraPreviewOnRequested | LocalUserAction::CameraOnRequested => state,
    }
}

fn with_mic(
    state: LocalUserState,
    operation: AudioOperationalStatus,
    error: Option<crate::types::CallCompositeError>,
) -> LocalUserState {
    LocalUserState {
        audio: AudioState {
            operation,
            error,
            ..state.audio
        },
        ..state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SdkError;
    use crate::redux::state::AudioDeviceSelectionStatus;
    use crate::types::{CallCompositeError, ErrorCode};

    #[test]
    fn test_camera_on_flow() {
        let state = reduce(
            LocalUserState::default(),
            &LocalUserAction::CameraOnTriggered.into(),
        );
        assert_eq!(state.camera.operation, CameraOperationalStatus::Pending);

        let state = reduce(
            state,
            &LocalUserAction::CameraOnSucceeded("stream-1".to_string()).into(),
        );
        assert_eq!(state.camera.operation, CameraOperationalStatus::On);
        assert_eq!(state.video_stream_id.as_deref(), Some("stream-1"));
    }

    #[test]
    fn test_camera_switch_failure_rolls_back() {
        let state = reduce(
            LocalUserState::default(),
            &LocalUserAction::CameraSwitchTriggered.into(),
        );
        assert_eq!(state.camera.device, CameraDeviceSelectionStatus::Switching);

        let error = CallCompositeError::new(
            ErrorCode::SwitchCameraFailed,
            SdkError::Camera("no rear camera".to_string()),
        );
        let state = reduce(
            state,
            &LocalUserAction::CameraSwitchFailed {
                previous: CameraDeviceSelectionStatus::Front,
                error: error.clone(),
            }
            .into(),
        );
        assert_eq!(state.camera.device, CameraDeviceSelectionStatus::Front);
        assert_eq!(state.camera.error, Some(error));
    }

    #[test]
    fn test_mic_failure_records_error() {
        let error = CallCompositeError::from_code(ErrorCode::TurnMicOnFailed);
        let state = reduce(
            LocalUserState::default(),
            &LocalUserAction::MicOnFailed(error.clone()).into(),
        );
        assert_eq!(state.audio.operation, AudioOperationalStatus::Off);
        assert_eq!(state.audio.error, Some(error));
    }

    #[test]
    fn test_audio_device_request_then_success() {
        let state = reduce(
            LocalUserState::default(),
            &LocalUserAction::AudioDeviceChangeRequested(
                AudioDeviceSelectionStatus::ReceiverSelected,
            )
            .into(),
        );
        assert_eq!(state.audio.device, AudioDeviceSelectionStatus::ReceiverRequested);

        let state = reduce(
            state,
            &LocalUserAction::AudioDeviceChangeSucceeded(
                AudioDeviceSelectionStatus::ReceiverSelected,
            )
            .into(),
        );
        assert_eq!(state.audio.device, AudioDeviceSelectionStatus::ReceiverSelected);
    }

    #[test]
    fn test_audio_device_failure_restores_previous() {
        let state = reduce(
            LocalUserState::default(),
            &LocalUserAction::AudioDeviceChangeRequested(
                AudioDeviceSelectionStatus::BluetoothScoSelected,
            )
            .into(),
        );
        let state = reduce(
            state,
            &LocalUserAction::AudioDeviceChangeFailed {
                previous: AudioDeviceSelectionStatus::SpeakerSelected,
                error: CallCompositeError::from_code(ErrorCode::AudioDeviceChangeFailed),
            }
            .into(),
        );
        assert_eq!(state.audio.device, AudioDeviceSelectionStatus::SpeakerSelected);
        assert!(state.audio.error.is_some());
    }

    #[test]
    fn test_unrelated_action_is_noop() {
        let state = reduce(
            LocalUserState::default(),
            &LocalUserAction::CameraOnSucceeded("s".to_string()).into(),
        );
        let same = reduce(
            state.clone(),
            &crate::redux::action::CallingAction::HoldRequested.into(),
        );
        assert_eq!(same, state);
    }
}
