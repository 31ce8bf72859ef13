//! Mock SDK and platform adapters for testing
//!
//! [`MockCallingSdk`] records every command, can be told to fail specific
//! operations and lets tests push [`SdkEvent`]s as if the SDK had emitted
//! them. It also serves as a [`ParticipantDirectory`] over its roster.
//! [`MockAudioRouter`] records routes and fails on demand.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::broadcast;
use tokio::time::sleep;

use super::{AudioRouter, CallingSdk, ParticipantDirectory, SdkEvent, SdkResult};
use crate::error::{AudioRoutingError, SdkError};
use crate::redux::state::{AudioDevice, CallingStatus, CameraDeviceSelectionStatus};
use crate::types::{ChatMessage, CommunicationIdentifier, ParticipantInfoModel};

/// SDK commands, as recorded by [`MockCallingSdk`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SdkOperation {
    SetupCall,
    StartCall,
    EndCall,
    Hold,
    Resume,
    StartPreview,
    CameraOn,
    CameraOff,
    PauseCamera,
    SwitchCamera,
    MicOn,
    MicOff,
    FetchParticipants,
    StartCaptions,
    StopCaptions,
    SendMessage,
    Dispose,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Scriptable calling SDK
pub struct MockCallingSdk {
    events: broadcast::Sender<SdkEvent>,
    failures: Mutex<HashMap<SdkOperation, SdkError>>,
    calls: Mutex<Vec<SdkOperation>>,
    roster: Mutex<BTreeMap<String, ParticipantInfoModel>>,
    delay: Duration,
    streams: AtomicUsize,
    messages: AtomicUsize,
}

impl Default for MockCallingSdk {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCallingSdk {
    pub fn new() -> Self {
        Self::with_delay(Duration::ZERO)
    }

    /// Every command waits `delay` before completing
    pub fn with_delay(delay: Duration) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            events,
            failures: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            roster: Mutex::new(BTreeMap::new()),
            delay,
            streams: AtomicUsize::new(0),
            messages: AtomicUsize::new(0),
        }
    }

    /// Make `operation` fail with `error` until [`succeed`](Self::succeed) is called
    pub fn fail(&self, operation: SdkOperation, error: SdkError) {
        lock(&self.failures).insert(operation, error);
    }

    pub fn succeed(&self, operation: SdkOperation) {
        lock(&self.failures).remove(&operation);
    }

    /// Commands received so far, in order
    pub fn calls(&self) -> Vec<SdkOperation> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self, operation: SdkOperation) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|call| **call == operation)
            .count()
    }

    /// Emit an event to every current subscriber
    pub fn emit(&self, event: SdkEvent) {
        // No subscribers yet is fine
        let _ = self.events.send(event);
    }

    /// Replace the roster and announce it
    pub fn set_participants(&self, participants: BTreeMap<String, ParticipantInfoModel>) {
        *lock(&self.roster) = participants.clone();
        self.emit(SdkEvent::ParticipantsUpdated(participants));
    }

    async fn command(&self, operation: SdkOperation) -> SdkResult<()> {
        lock(&self.calls).push(operation);
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
        match lock(&self.failures).get(&operation) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn next_stream_id(&self) -> String {
        format!("local-video-{}", self.streams.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

#[async_trait]
impl CallingSdk for MockCallingSdk {
    async fn setup_call(&self) -> SdkResult<()> {
        self.command(SdkOperation::SetupCall).await
    }

    async fn start_call(&self, _camera_on: bool, _mic_on: bool) -> SdkResult<()> {
        self.command(SdkOperation::StartCall).await?;
        self.emit(SdkEvent::CallStateChanged {
            status: CallingStatus::Connecting,
            error: None,
        });
        self.emit(SdkEvent::CallIdChanged("mock-call".to_string()));
        self.emit(SdkEvent::CallStateChanged {
            status: CallingStatus::Connected,
            error: None,
        });
        Ok(())
    }

    async fn end_call(&self) -> SdkResult<()> {
        self.command(SdkOperation::EndCall).await?;
        self.emit(SdkEvent::CallStateChanged {
            status: CallingStatus::Disconnected,
            error: None,
        });
        Ok(())
    }

    async fn hold(&self) -> SdkResult<()> {
        self.command(SdkOperation::Hold).await?;
        self.emit(SdkEvent::CallStateChanged {
            status: CallingStatus::LocalHold,
            error: None,
        });
        Ok(())
    }

    async fn resume(&self) -> SdkResult<()> {
        self.command(SdkOperation::Resume).await?;
        self.emit(SdkEvent::CallStateChanged {
            status: CallingStatus::Connected,
            error: None,
        });
        Ok(())
    }

    async fn start_preview(&self) -> SdkResult<String> {
        self.command(SdkOperation::StartPreview).await?;
        Ok(self.next_stream_id())
    }

    async fn turn_camera_on(&self) -> SdkResult<String> {
        self.command(SdkOperation::CameraOn).await?;
        Ok(self.next_stream_id())
    }

    async fn turn_camera_off(&self) -> SdkResult<()> {
        self.command(SdkOperation::CameraOff).await
    }

    async fn pause_camera(&self) -> SdkResult<()> {
        self.command(SdkOperation::PauseCamera).await
    }

    async fn switch_camera(
        &self,
        target: CameraDeviceSelectionStatus,
    ) -> SdkResult<CameraDeviceSelectionStatus> {
        self.command(SdkOperation::SwitchCamera).await?;
        Ok(target)
    }

    async fn turn_mic_on(&self) -> SdkResult<()> {
        self.command(SdkOperation::MicOn).await
    }

    async fn turn_mic_off(&self) -> SdkResult<()> {
        self.command(SdkOperation::MicOff).await
    }

    async fn fetch_participants(&self) -> SdkResult<BTreeMap<String, ParticipantInfoModel>> {
        self.command(SdkOperation::FetchParticipants).await?;
        Ok(lock(&self.roster).clone())
    }

    async fn start_captions(&self, _language: &str) -> SdkResult<()> {
        self.command(SdkOperation::StartCaptions).await
    }

    async fn stop_captions(&self) -> SdkResult<()> {
        self.command(SdkOperation::StopCaptions).await
    }

    async fn send_message(&self, content: &str) -> SdkResult<ChatMessage> {
        self.command(SdkOperation::SendMessage).await?;
        let n = self.messages.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(ChatMessage {
            id: format!("mock-message-{}", n),
            sender_id: "local".to_string(),
            sender_display_name: None,
            content: content.to_string(),
            created_on: Utc::now(),
        })
    }

    fn events(&self) -> broadcast::Receiver<SdkEvent> {
        self.events.subscribe()
    }

    async fn dispose(&self) {
        lock(&self.calls).push(SdkOperation::Dispose);
    }
}

impl ParticipantDirectory for MockCallingSdk {
    fn identifier(&self, participant_id: &str) -> Option<CommunicationIdentifier> {
        lock(&self.roster)
            .contains_key(participant_id)
            .then(|| CommunicationIdentifier::CommunicationUser(participant_id.to_string()))
    }
}

/// Recording audio router
#[derive(Default)]
pub struct MockAudioRouter {
    routes: Mutex<Vec<AudioDevice>>,
    unavailable: Mutex<HashSet<AudioDevice>>,
}

impl MockAudioRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Routing to `device` fails until [`restore`](Self::restore) is called
    pub fn fail_for(&self, device: AudioDevice) {
        lock(&self.unavailable).insert(device);
    }

    pub fn restore(&self, device: AudioDevice) {
        lock(&self.unavailable).remove(&device);
    }

    /// Devices successfully routed to, in order
    pub fn routes(&self) -> Vec<AudioDevice> {
        lock(&self.routes).clone()
    }
}

impl AudioRouter for MockAudioRouter {
    fn route_to(&self, device: AudioDevice) -> Result<(), AudioRoutingError> {
        if lock(&self.unavailable).contains(&device) {
            return Err(AudioRoutingError::Unavailable(format!("{:?}", device)));
        }
        lock(&self.routes).push(device);
        Ok(())
    }
}
