//! Core value types shared by state, actions and the external event surface

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AudioRoutingError, SdkError};

/// Identifies one composite instance (one call session).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstanceId(Uuid);

impl InstanceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for InstanceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Classification of errors surfaced to the host application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    TokenExpired,
    CallStartFailed,
    CallEndFailed,
    CallEvicted,
    CallDeclined,
    CallHoldFailed,
    CallResumeFailed,
    TurnCameraOnFailed,
    TurnCameraOffFailed,
    SwitchCameraFailed,
    TurnMicOnFailed,
    TurnMicOffFailed,
    AudioDeviceChangeFailed,
    CaptionsFailed,
    MessageSendFailed,
    NetworkConnectionNotAvailable,
}

/// Event codes attached to call-state errors.
///
/// Errors carrying one of these describe an expected end of call rather
/// than a failure, and are not reported to the host's error handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallCompositeEventCode {
    CallEvicted,
    CallDeclined,
}

/// Underlying cause of a [`CallCompositeError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCause {
    Sdk(SdkError),
    AudioRouting(AudioRoutingError),
}

impl fmt::Display for ErrorCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCause::Sdk(e) => write!(f, "{}", e),
            ErrorCause::AudioRouting(e) => write!(f, "{}", e),
        }
    }
}

impl From<SdkError> for ErrorCause {
    fn from(e: SdkError) -> Self {
        ErrorCause::Sdk(e)
    }
}

impl From<AudioRoutingError> for ErrorCause {
    fn from(e: AudioRoutingError) -> Self {
        ErrorCause::AudioRouting(e)
    }
}

/// An error value held in state. Compared by value, never by identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallCompositeError {
    pub code: ErrorCode,
    pub cause: Option<ErrorCause>,
}

impl CallCompositeError {
    pub fn new(code: ErrorCode, cause: impl Into<ErrorCause>) -> Self {
        Self {
            code,
            cause: Some(cause.into()),
        }
    }

    pub fn from_code(code: ErrorCode) -> Self {
        Self { code, cause: None }
    }
}

impl fmt::Display for CallCompositeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.cause {
            Some(cause) => write!(f, "{:?}: {}", self.code, cause),
            None => write!(f, "{:?}", self.code),
        }
    }
}

/// A non-fatal call condition reported by the SDK.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallStateError {
    pub code: ErrorCode,
    pub event_code: Option<CallCompositeEventCode>,
}

impl CallStateError {
    pub fn new(code: ErrorCode) -> Self {
        Self {
            code,
            event_code: None,
        }
    }

    pub fn with_event(code: ErrorCode, event_code: CallCompositeEventCode) -> Self {
        Self {
            code,
            event_code: Some(event_code),
        }
    }
}

/// Identity of a remote participant as understood by the host application.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum CommunicationIdentifier {
    CommunicationUser(String),
    PhoneNumber(String),
    MicrosoftTeamsUser(String),
    Unknown(String),
}

impl CommunicationIdentifier {
    pub fn raw_id(&self) -> &str {
        match self {
            CommunicationIdentifier::CommunicationUser(id)
            | CommunicationIdentifier::PhoneNumber(id)
            | CommunicationIdentifier::MicrosoftTeamsUser(id)
            | CommunicationIdentifier::Unknown(id) => id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamType {
    Video,
    ScreenSharing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoStreamModel {
    pub video_stream_id: String,
    pub stream_type: StreamType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantStatus {
    Idle,
    Connecting,
    Ringing,
    Connected,
    Hold,
    InLobby,
    Disconnected,
}

/// Observable fields of one remote participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantInfoModel {
    pub user_identifier: String,
    pub display_name: String,
    pub is_muted: bool,
    pub is_speaking: bool,
    pub status: ParticipantStatus,
    pub camera_video_stream: Option<VideoStreamModel>,
    pub screen_share_stream: Option<VideoStreamModel>,
}

impl ParticipantInfoModel {
    pub fn new(user_identifier: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            user_identifier: user_identifier.into(),
            display_name: display_name.into(),
            is_muted: false,
            is_speaking: false,
            status: ParticipantStatus::Connected,
            camera_video_stream: None,
            screen_share_stream: None,
        }
    }

    pub fn is_on_hold(&self) -> bool {
        self.status == ParticipantStatus::Hold
    }
}

/// Host-supplied persona data rendered for a participant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParticipantViewData {
    pub display_name: Option<String>,
    pub avatar: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub sender_id: String,
    pub sender_display_name: Option<String>,
    pub content: String,
    pub created_on: DateTime<Utc>,
}
