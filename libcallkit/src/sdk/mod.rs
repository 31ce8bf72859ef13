//! Calling SDK and platform adapters
//!
//! The store never talks to the native calling SDK directly. Middlewares
//! drive it through [`CallingSdk`] and translate its [`SdkEvent`]s into
//! actions; audio routing and participant identity lookups go through
//! their own small adapters.
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use libcallkit::sdk::{CallingSdk, mock::MockCallingSdk};
//!
//! # async fn example() -> Result<(), libcallkit::error::SdkError> {
//! let sdk: Arc<dyn CallingSdk> = Arc::new(MockCallingSdk::new());
//!
//! // Subscribe before starting so no state change is missed
//! let mut events = sdk.events();
//! sdk.start_call(false, true).await?;
//!
//! if let Ok(event) = events.recv().await {
//!     println!("SDK event: {:?}", event);
//! }
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::error::{AudioRoutingError, SdkError};
use crate::redux::state::{AudioDevice, CallingStatus, CameraDeviceSelectionStatus};
use crate::types::{CallStateError, ChatMessage, CommunicationIdentifier, ParticipantInfoModel};

// Mocks are available in all builds so integration tests and the simulator can use them
pub mod mock;

pub type SdkResult<T> = std::result::Result<T, SdkError>;

/// Command surface of the native calling/chat SDK
///
/// Commands complete asynchronously. Anything the SDK reports on its own
/// (state changes, roster updates, incoming messages) arrives on
/// [`events`](CallingSdk::events) instead.
#[async_trait]
pub trait CallingSdk: Send + Sync {
    /// Prepare devices and local preview before joining
    async fn setup_call(&self) -> SdkResult<()>;

    /// Join the configured call
    ///
    /// # Errors
    ///
    /// Returns `SdkError::Authentication` when the access token is rejected,
    /// `SdkError::CallStart` for any other failure to join.
    async fn start_call(&self, camera_on: bool, mic_on: bool) -> SdkResult<()>;

    async fn end_call(&self) -> SdkResult<()>;

    async fn hold(&self) -> SdkResult<()>;

    async fn resume(&self) -> SdkResult<()>;

    /// Start the local preview; returns the local video stream id
    async fn start_preview(&self) -> SdkResult<String>;

    /// Start outgoing video; returns the local video stream id
    async fn turn_camera_on(&self) -> SdkResult<String>;

    async fn turn_camera_off(&self) -> SdkResult<()>;

    /// Stop outgoing video without releasing the camera intent
    async fn pause_camera(&self) -> SdkResult<()>;

    /// Switch to `target`; returns the device actually selected
    async fn switch_camera(
        &self,
        target: CameraDeviceSelectionStatus,
    ) -> SdkResult<CameraDeviceSelectionStatus>;

    async fn turn_mic_on(&self) -> SdkResult<()>;

    async fn turn_mic_off(&self) -> SdkResult<()>;

    /// Current remote roster keyed by raw participant id
    async fn fetch_participants(&self) -> SdkResult<BTreeMap<String, ParticipantInfoModel>>;

    async fn start_captions(&self, language: &str) -> SdkResult<()>;

    async fn stop_captions(&self) -> SdkResult<()>;

    async fn send_message(&self, content: &str) -> SdkResult<ChatMessage>;

    /// Subscribe to SDK events emitted from now on
    fn events(&self) -> broadcast::Receiver<SdkEvent>;

    /// Release SDK resources. Safe to call more than once.
    async fn dispose(&self);
}

/// Unsolicited SDK notifications
#[derive(Debug, Clone, PartialEq)]
pub enum SdkEvent {
    CallStateChanged {
        status: CallingStatus,
        error: Option<CallStateError>,
    },
    CallIdChanged(String),
    RecordingChanged(bool),
    TranscribingChanged(bool),
    ParticipantsUpdated(BTreeMap<String, ParticipantInfoModel>),
    DominantSpeakersChanged(Vec<String>),
    CamerasCountChanged(usize),
    MessageReceived(ChatMessage),
}

/// Platform audio routing
pub trait AudioRouter: Send + Sync {
    fn route_to(&self, device: AudioDevice) -> Result<(), AudioRoutingError>;
}

/// Resolves raw participant ids to the identifiers the host understands
pub trait ParticipantDirectory: Send + Sync {
    fn identifier(&self, participant_id: &str) -> Option<CommunicationIdentifier>;
}
