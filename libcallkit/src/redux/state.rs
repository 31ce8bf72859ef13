//! Application state
//!
//! Immutable state tree. Only the store produces new values, through the
//! reducer (see `reducer/`).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::CallConfiguration;
use crate::types::{CallCompositeError, CallStateError, ChatMessage, ParticipantInfoModel};

/// Root application state
///
/// One instance per session; replaced wholesale on every dispatch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppState {
    pub call: CallState,
    pub local_user: LocalUserState,
    pub remote_participants: RemoteParticipantsState,
    pub permissions: PermissionState,
    pub lifecycle: LifecycleState,
    pub error: ErrorState,
    pub navigation: NavigationState,
    pub captions: CaptionsState,
    pub chat: ChatState,
}

impl AppState {
    /// Initial state for a session launched with `config`.
    pub fn new(config: &CallConfiguration) -> Self {
        Self {
            local_user: LocalUserState {
                display_name: config.display_name.clone(),
                camera: CameraState {
                    operation: if config.camera_on_by_default {
                        CameraOperationalStatus::Pending
                    } else {
                        CameraOperationalStatus::Off
                    },
                    ..CameraState::default()
                },
                audio: AudioState {
                    operation: if config.mic_on_by_default {
                        AudioOperationalStatus::Pending
                    } else {
                        AudioOperationalStatus::Off
                    },
                    device: config.default_audio_device,
                    ..AudioState::default()
                },
                video_stream_id: None,
            },
            ..Self::default()
        }
    }

    /// Is there an active (or activating) call?
    pub fn has_call(&self) -> bool {
        self.call.calling_status != CallingStatus::None
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            call: CallState::default(),
            local_user: LocalUserState::default(),
            remote_participants: RemoteParticipantsState::default(),
            permissions: PermissionState::default(),
            lifecycle: LifecycleState::default(),
            error: ErrorState::default(),
            navigation: NavigationState::default(),
            captions: CaptionsState::default(),
            chat: ChatState::default(),
        }
    }
}

// === Call ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CallingStatus {
    #[default]
    None,
    EarlyMedia,
    Connecting,
    Ringing,
    Connected,
    LocalHold,
    RemoteHold,
    InLobby,
    Disconnecting,
    Disconnected,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CallState {
    pub calling_status: CallingStatus,
    pub call_id: Option<String>,
    pub call_start_time: Option<DateTime<Utc>>,
    pub join_requested: bool,
    pub is_recording: bool,
    pub is_transcribing: bool,
}

// === Local user ===

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct LocalUserState {
    pub display_name: Option<String>,
    pub camera: CameraState,
    pub audio: AudioState,
    pub video_stream_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraOperationalStatus {
    Pending,
    On,
    #[default]
    Off,
    Paused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraDeviceSelectionStatus {
    #[default]
    Front,
    Back,
    Switching,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CameraState {
    pub operation: CameraOperationalStatus,
    pub device: CameraDeviceSelectionStatus,
    pub cameras_count: usize,
    pub error: Option<CallCompositeError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioOperationalStatus {
    Pending,
    On,
    #[default]
    Off,
}

/// Physical audio route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioDevice {
    Speaker,
    Receiver,
    BluetoothSco,
}

/// Audio route as tracked in state: either requested (in flight) or
/// selected (confirmed by the audio router).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioDeviceSelectionStatus {
    SpeakerRequested,
    #[default]
    SpeakerSelected,
    ReceiverRequested,
    ReceiverSelected,
    BluetoothScoRequested,
    BluetoothScoSelected,
}

impl AudioDeviceSelectionStatus {
    pub fn device(self) -> AudioDevice {
        match self {
            Self::SpeakerRequested | Self::SpeakerSelected => AudioDevice::Speaker,
            Self::ReceiverRequested | Self::ReceiverSelected => AudioDevice::Receiver,
            Self::BluetoothScoRequested | Self::BluetoothScoSelected => AudioDevice::BluetoothSco,
        }
    }

    pub fn requested(self) -> Self {
        Self::requested_for(self.device())
    }

    pub fn selected(self) -> Self {
        Self::selected_for(self.device())
    }

    pub fn requested_for(device: AudioDevice) -> Self {
        match device {
            AudioDevice::Speaker => Self::SpeakerRequested,
            AudioDevice::Receiver => Self::ReceiverRequested,
            AudioDevice::BluetoothSco => Self::BluetoothScoRequested,
        }
    }

    pub fn selected_for(device: AudioDevice) -> Self {
        match device {
            AudioDevice::Speaker => Self::SpeakerSelected,
            AudioDevice::Receiver => Self::ReceiverSelected,
            AudioDevice::BluetoothSco => Self::BluetoothScoSelected,
        }
    }

    pub fn is_bluetooth(self) -> bool {
        self.device() == AudioDevice::BluetoothSco
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct BluetoothState {
    pub available: bool,
    pub device_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AudioState {
    pub operation: AudioOperationalStatus,
    pub device: AudioDeviceSelectionStatus,
    pub bluetooth: BluetoothState,
    pub error: Option<CallCompositeError>,
}

// === Remote participants ===

/// Roster of remote participants.
///
/// `modified_timestamp` advances whenever membership or any entry's
/// observable fields change, and only then; observers compare it instead
/// of diffing the map.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RemoteParticipantsState {
    pub participant_map: BTreeMap<String, ParticipantInfoModel>,
    pub modified_timestamp: u64,
    pub dominant_speakers: Vec<String>,
    pub dominant_speakers_modified_timestamp: u64,
}

// === Permissions / lifecycle ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionStatus {
    #[default]
    Unknown,
    NotAsked,
    Requesting,
    Granted,
    Denied,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PermissionState {
    pub audio: PermissionStatus,
    pub camera: PermissionStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleStatus {
    #[default]
    Foreground,
    Background,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct LifecycleState {
    pub status: LifecycleStatus,
}

// === Errors / navigation ===

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ErrorState {
    pub fatal_error: Option<CallCompositeError>,
    pub call_state_error: Option<CallStateError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationStatus {
    #[default]
    None,
    Setup,
    InCall,
    Exit,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct NavigationState {
    pub status: NavigationStatus,
}

// === Captions / chat ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptionsStatus {
    #[default]
    Off,
    Starting,
    On,
    Stopping,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CaptionsState {
    pub status: CaptionsStatus,
    pub spoken_language: Option<String>,
    pub error: Option<CallCompositeError>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ChatState {
    pub messages: Vec<ChatMessage>,
    pub last_send_error: Option<CallCompositeError>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_follows_configuration() {
        let config = CallConfiguration::builder("token")
            .display_name("Ada")
            .camera_on_by_default(true)
            .mic_on_by_default(false)
            .build();

        let state = AppState::new(&config);
        assert_eq!(state.local_user.display_name.as_deref(), Some("Ada"));
        assert_eq!(state.local_user.camera.operation, CameraOperationalStatus::Pending);
        assert_eq!(state.local_user.audio.operation, AudioOperationalStatus::Off);
        assert_eq!(state.call.calling_status, CallingStatus::None);
        assert!(!state.has_call());
    }

    #[test]
    fn test_audio_selection_mapping() {
        let status = AudioDeviceSelectionStatus::BluetoothScoSelected;
        assert_eq!(status.requested(), AudioDeviceSelectionStatus::BluetoothScoRequested);
        assert_eq!(status.requested().selected(), status);
        assert!(status.is_bluetooth());
        assert_eq!(
            AudioDeviceSelectionStatus::ReceiverRequested.device(),
            AudioDevice::Receiver
        );
    }
}
