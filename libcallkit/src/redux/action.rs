//! Actions for the reducer pattern
//!
//! All state transitions are triggered by actions. Actions are immutable
//! values that describe something that happened or something that is
//! requested; reducers (see `reducer/`) apply them to state and
//! middlewares (see `middleware/`) turn requests into side effects.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use super::state::{
    AudioDeviceSelectionStatus, CallingStatus, CameraDeviceSelectionStatus, PermissionStatus,
};
use crate::types::{CallCompositeError, CallStateError, ChatMessage, ParticipantInfoModel};

/// Every action the store accepts, grouped by domain
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Calling(CallingAction),
    LocalUser(LocalUserAction),
    Participant(ParticipantAction),
    Permission(PermissionAction),
    Lifecycle(LifecycleAction),
    Error(ErrorAction),
    Navigation(NavigationAction),
    Captions(CaptionsAction),
    Chat(ChatAction),
}

#[derive(Debug, Clone, PartialEq)]
pub enum CallingAction {
    /// Prepare the SDK (device enumeration, preview) before joining
    SetupCall,
    CallStartRequested,
    CallEndRequested,
    HoldRequested,
    ResumeRequested,
    /// SDK reported a new call status
    StateUpdated(CallingStatus),
    CallIdUpdated(String),
    CallStartTimeUpdated(DateTime<Utc>),
    IsRecordingUpdated(bool),
    IsTranscribingUpdated(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub enum LocalUserAction {
    // === Camera ===
    CameraPreviewOnRequested,
    CameraPreviewOnTriggered,
    CameraPreviewOnSucceeded(String),
    CameraPreviewOnFailed(CallCompositeError),
    /// UI asked for the camera; resolved to preview or in-call by middleware
    CameraOnRequested,
    CameraOnTriggered,
    CameraOnSucceeded(String),
    CameraOnFailed(CallCompositeError),
    CameraOffTriggered,
    CameraOffSucceeded,
    CameraOffFailed(CallCompositeError),
    /// Outgoing video stopped because the app went to background
    CameraPauseSucceeded,
    CameraSwitchTriggered,
    CameraSwitchSucceeded(CameraDeviceSelectionStatus),
    /// Carries the device to roll back to
    CameraSwitchFailed {
        previous: CameraDeviceSelectionStatus,
        error: CallCompositeError,
    },
    CamerasCountUpdated(usize),

    // === Microphone ===
    MicOnTriggered,
    MicOnSucceeded,
    MicOnFailed(CallCompositeError),
    MicOffTriggered,
    MicOffSucceeded,
    MicOffFailed(CallCompositeError),

    // === Audio routing ===
    AudioDeviceChangeRequested(AudioDeviceSelectionStatus),
    AudioDeviceChangeSucceeded(AudioDeviceSelectionStatus),
    /// Carries the route to roll back to
    AudioDeviceChangeFailed {
        previous: AudioDeviceSelectionStatus,
        error: CallCompositeError,
    },
    AudioDeviceBluetoothScoAvailable {
        available: bool,
        device_name: Option<String>,
    },

    DisplayNameSet(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParticipantAction {
    ListUpdated(BTreeMap<String, ParticipantInfoModel>),
    DominantSpeakersUpdated(Vec<String>),
    FetchRequested,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PermissionAction {
    AudioPermissionSet(PermissionStatus),
    CameraPermissionSet(PermissionStatus),
}

#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleAction {
    EnterForegroundTriggered,
    EnterForegroundSucceeded,
    EnterBackgroundTriggered,
    EnterBackgroundSucceeded,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ErrorAction {
    FatalErrorOccurred(CallCompositeError),
    CallStateErrorOccurred(CallStateError),
    /// Tear down the call and leave the call UI unconditionally
    EmergencyExit,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NavigationAction {
    SetupLaunched,
    CallLaunched,
    Exit,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CaptionsAction {
    StartRequested { language: String },
    Started { language: String },
    StopRequested,
    Stopped,
    Failed(CallCompositeError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChatAction {
    SendMessageRequested { content: String },
    MessageSent(ChatMessage),
    SendMessageFailed(CallCompositeError),
    MessageReceived(ChatMessage),
}

impl Action {
    /// Stable name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Action::Calling(a) => match a {
                CallingAction::SetupCall => "calling.setup_call",
                CallingAction::CallStartRequested => "calling.call_start_requested",
                CallingAction::CallEndRequested => "calling.call_end_requested",
                CallingAction::HoldRequested => "calling.hold_requested",
                CallingAction::ResumeRequested => "calling.resume_requested",
                CallingAction::StateUpdated(_) => "calling.state_updated",
                CallingAction::CallIdUpdated(_) => "calling.call_id_updated",
                CallingAction::CallStartTimeUpdated(_) => "calling.call_start_time_updated",
                CallingAction::IsRecordingUpdated(_) => "calling.is_recording_updated",
                CallingAction::IsTranscribingUpdated(_) => "calling.is_transcribing_updated",
            },
            Action::LocalUser(a) => match a {
                LocalUserAction::CameraPreviewOnRequested => "local_user.camera_preview_on_requested",
                LocalUserAction::CameraPreviewOnTriggered => "local_user.camera_preview_on_triggered",
                LocalUserAction::CameraPreviewOnSucceeded(_) => "local_user.camera_preview_on_succeeded",
                LocalUserAction::CameraPreviewOnFailed(_) => "local_user.camera_preview_on_failed",
                LocalUserAction::CameraOnRequested => "local_user.camera_on_requested",
                LocalUserAction::CameraOnTriggered => "local_user.camera_on_triggered",
                LocalUserAction::CameraOnSucceeded(_) => "local_user.camera_on_succeeded",
                LocalUserAction::CameraOnFailed(_) => "local_user.camera_on_failed",
                LocalUserAction::CameraOffTriggered => "local_user.camera_off_triggered",
                LocalUserAction::CameraOffSucceeded => "local_user.camera_off_succeeded",
                LocalUserAction::CameraOffFailed(_) => "local_user.camera_off_failed",
                LocalUserAction::CameraPauseSucceeded => "local_user.camera_pause_succeeded",
                LocalUserAction::CameraSwitchTriggered => "local_user.camera_switch_triggered",
                LocalUserAction::CameraSwitchSucceeded(_) => "local_user.camera_switch_succeeded",
                LocalUserAction::CameraSwitchFailed { .. } => "local_user.camera_switch_failed",
                LocalUserAction::CamerasCountUpdated(_) => "local_user.cameras_count_updated",
                LocalUserAction::MicOnTriggered => "local_user.mic_on_triggered",
                LocalUserAction::MicOnSucceeded => "local_user.mic_on_succeeded",
                LocalUserAction::MicOnFailed(_) => "local_user.mic_on_failed",
                LocalUserAction::MicOffTriggered => "local_user.mic_off_triggered",
                LocalUserAction::MicOffSucceeded => "local_user.mic_off_succeeded",
                LocalUserAction::MicOffFailed(_) => "local_user.mic_off_failed",
                LocalUserAction::AudioDeviceChangeRequested(_) => "local_user.audio_device_change_requested",
                LocalUserAction::AudioDeviceChangeSucceeded(_) => "local_user.audio_device_change_succeeded",
                LocalUserAction::AudioDeviceChangeFailed { .. } => "local_user.audio_device_change_failed",
                LocalUserAction::AudioDeviceBluetoothScoAvailable { .. } => {
                    "local_user.audio_device_bluetooth_sco_available"
                }
                LocalUserAction::DisplayNameSet(_) => "local_user.display_name_set",
            },
            Action::Participant(a) => match a {
                ParticipantAction::ListUpdated(_) => "participant.list_updated",
                ParticipantAction::DominantSpeakersUpdated(_) => "participant.dominant_speakers_updated",
                ParticipantAction::FetchRequested => "participant.fetch_requested",
            },
            Action::Permission(a) => match a {
                PermissionAction::AudioPermissionSet(_) => "permission.audio_permission_set",
                PermissionAction::CameraPermissionSet(_) => "permission.camera_permission_set",
            },
            Action::Lifecycle(a) => match a {
                LifecycleAction::EnterForegroundTriggered => "lifecycle.enter_foreground_triggered",
                LifecycleAction::EnterForegroundSucceeded => "lifecycle.enter_foreground_succeeded",
                LifecycleAction::EnterBackgroundTriggered => "lifecycle.enter_background_triggered",
                LifecycleAction::EnterBackgroundSucceeded => "lifecycle.enter_background_succeeded",
            },
            Action::Error(a) => match a {
                ErrorAction::FatalErrorOccurred(_) => "error.fatal_error_occurred",
                ErrorAction::CallStateErrorOccurred(_) => "error.call_state_error_occurred",
                ErrorAction::EmergencyExit => "error.emergency_exit",
            },
            Action::Navigation(a) => match a {
                NavigationAction::SetupLaunched => "navigation.setup_launched",
                NavigationAction::CallLaunched => "navigation.call_launched",
                NavigationAction::Exit => "navigation.exit",
            },
            Action::Captions(a) => match a {
                CaptionsAction::StartRequested { .. } => "captions.start_requested",
                CaptionsAction::Started { .. } => "captions.started",
                CaptionsAction::StopRequested => "captions.stop_requested",
                CaptionsAction::Stopped => "captions.stopped",
                CaptionsAction::Failed(_) => "captions.failed",
            },
            Action::Chat(a) => match a {
                ChatAction::SendMessageRequested { .. } => "chat.send_message_requested",
                ChatAction::MessageSent(_) => "chat.message_sent",
                ChatAction::SendMessageFailed(_) => "chat.send_message_failed",
                ChatAction::MessageReceived(_) => "chat.message_received",
            },
        }
    }
}

impl From<CallingAction> for Action {
    fn from(a: CallingAction) -> Self {
        Action::Calling(a)
    }
}

impl From<LocalUserAction> for Action {
    fn from(a: LocalUserAction) -> Self {
        Action::LocalUser(a)
    }
}

impl From<ParticipantAction> for Action {
    fn from(a: ParticipantAction) -> Self {
        Action::Participant(a)
    }
}

impl From<PermissionAction> for Action {
    fn from(a: PermissionAction) -> Self {
        Action::Permission(a)
    }
}

impl From<LifecycleAction> for Action {
    fn from(a: LifecycleAction) -> Self {
        Action::Lifecycle(a)
    }
}

impl From<ErrorAction> for Action {
    fn from(a: ErrorAction) -> Self {
        Action::Error(a)
    }
}

impl From<NavigationAction> for Action {
    fn from(a: NavigationAction) -> Self {
        Action::Navigation(a)
    }
}

impl From<CaptionsAction> for Action {
    fn from(a: CaptionsAction) -> Self {
        Action::Captions(a)
    }
}

impl From<ChatAction> for Action {
    fn from(a: ChatAction) -> Self {
        Action::Chat(a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_names() {
        assert_eq!(
            Action::from(ErrorAction::EmergencyExit).name(),
            "error.emergency_exit"
        );
        assert_eq!(
            Action::from(LocalUserAction::CameraOnSucceeded("s".to_string())).name(),
            "local_user.camera_on_succeeded"
        );
    }

    #[test]
    fn test_actions_compare_by_value() {
        let a: Action = CallingAction::StateUpdated(CallingStatus::Connected).into();
        let b: Action = CallingAction::StateUpdated(CallingStatus::Connected).into();
        assert_eq!(a, b);
    }
}
