use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;

use super::bridge;
use crate::error::SdkError;
use crate::redux::action::{
    Action, CallingAction, CaptionsAction, ChatAction, ErrorAction, LifecycleAction,
    LocalUserAction, NavigationAction, ParticipantAction, PermissionAction,
};
use crate::redux::state::{
    AppState, AudioOperationalStatus, CallingStatus, CameraDeviceSelectionStatus,
    CameraOperationalStatus, PermissionStatus,
};
use crate::redux::store::{Middleware, Next, Store};
use crate::sdk::CallingSdk;
use crate::types::{CallCompositeError, CallStateError, ErrorCode};

/// Calling middleware
///
/// Turns call-control, device, lifecycle, captions and chat requests into
/// SDK commands. Commands run as store effects; their outcome comes back as
/// `*Succeeded`/`*Failed` actions. Also owns the SDK event bridge for the
/// current call.
pub struct CallingMiddleware {
    sdk: Arc<dyn CallingSdk>,
    skip_setup_screen: bool,
    bridge: Mutex<Option<JoinHandle<()>>>,
    exiting: AtomicBool,
}

impl CallingMiddleware {
    pub fn new(sdk: Arc<dyn CallingSdk>, skip_setup_screen: bool) -> Self {
        Self {
            sdk,
            skip_setup_screen,
            bridge: Mutex::new(None),
            exiting: AtomicBool::new(false),
        }
    }

    /// Stop forwarding SDK events
    pub fn shutdown(&self) {
        if let Some(handle) = self.bridge_slot().take() {
            handle.abort();
        }
    }

    fn bridge_slot(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.bridge
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn start_bridge(&self, store: &Store<AppState>) {
        let mut slot = self.bridge_slot();
        if slot.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return;
        }
        // Subscribe here, before the start command is issued
        let events = self.sdk.events();
        *slot = Some(tokio::spawn(bridge::run(store.clone(), events)));
    }

    fn spawn<F, Fut>(&self, store: &Store<AppState>, effect: F)
    where
        F: FnOnce(Arc<dyn CallingSdk>, Store<AppState>) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        store.spawn_effect(effect(Arc::clone(&self.sdk), store.clone()));
    }

    fn on_calling(&self, store: &Store<AppState>, state: &AppState, action: &CallingAction) {
        match action {
            CallingAction::SetupCall => {
                let skip = self.skip_setup_screen;
                let preview = state.local_user.camera.operation == CameraOperationalStatus::Pending;
                self.spawn(store, move |sdk, store| async move {
                    match sdk.setup_call().await {
                        Ok(()) if skip => store.dispatch(CallingAction::CallStartRequested),
                        Ok(()) => {
                            store.dispatch(NavigationAction::SetupLaunched);
                            if preview {
                                store.dispatch(LocalUserAction::CameraPreviewOnTriggered);
                            }
                        }
                        Err(e) => fatal(&store, ErrorCode::CallStartFailed, e),
                    }
                });
            }

            CallingAction::CallStartRequested => {
                self.start_bridge(store);
                let camera_on = matches!(
                    state.local_user.camera.operation,
                    CameraOperationalStatus::Pending | CameraOperationalStatus::On
                );
                let mic_on = matches!(
                    state.local_user.audio.operation,
                    AudioOperationalStatus::Pending | AudioOperationalStatus::On
                );
                self.spawn(store, move |sdk, store| async move {
                    match sdk.start_call(camera_on, mic_on).await {
                        Ok(()) => {
                            store.dispatch(NavigationAction::CallLaunched);
                            if mic_on {
                                store.dispatch(LocalUserAction::MicOnSucceeded);
                            }
                            if camera_on {
                                store.dispatch(LocalUserAction::CameraOnTriggered);
                            }
                        }
                        Err(e @ SdkError::Authentication(_)) => {
                            fatal(&store, ErrorCode::TokenExpired, e)
                        }
                        Err(e) => fatal(&store, ErrorCode::CallStartFailed, e),
                    }
                });
            }

            CallingAction::CallEndRequested => {
                self.spawn(store, |sdk, store| async move {
                    match sdk.end_call().await {
                        Ok(()) => store.dispatch(NavigationAction::Exit),
                        Err(e) => fatal(&store, ErrorCode::CallEndFailed, e),
                    }
                });
            }

            CallingAction::HoldRequested => {
                self.spawn(store, |sdk, store| async move {
                    if let Err(e) = sdk.hold().await {
                        call_state_failure(&store, ErrorCode::CallHoldFailed, e);
                    }
                });
            }

            CallingAction::ResumeRequested => {
                self.spawn(store, |sdk, store| async move {
                    if let Err(e) = sdk.resume().await {
                        call_state_failure(&store, ErrorCode::CallResumeFailed, e);
                    }
                });
            }

            _ => {}
        }
    }

    fn on_local_user(&self, store: &Store<AppState>, state: &AppState, action: &LocalUserAction) {
        match action {
            LocalUserAction::CameraPreviewOnRequested => {
                store.dispatch(LocalUserAction::CameraPreviewOnTriggered);
            }

            LocalUserAction::CameraOnRequested => {
                if state.has_call() {
                    store.dispatch(LocalUserAction::CameraOnTriggered);
                } else {
                    store.dispatch(LocalUserAction::CameraPreviewOnTriggered);
                }
            }

            LocalUserAction::CameraPreviewOnTriggered => {
                self.spawn(store, |sdk, store| async move {
                    let action = match sdk.start_preview().await {
                        Ok(stream) => LocalUserAction::CameraPreviewOnSucceeded(stream),
                        Err(e) => LocalUserAction::CameraPreviewOnFailed(failure(
                            ErrorCode::TurnCameraOnFailed,
                            e,
                        )),
                    };
                    store.dispatch(action);
                });
            }

            LocalUserAction::CameraOnTriggered => {
                self.spawn(store, |sdk, store| async move {
                    let action = match sdk.turn_camera_on().await {
                        Ok(stream) => LocalUserAction::CameraOnSucceeded(stream),
                        Err(e) => {
                            LocalUserAction::CameraOnFailed(failure(ErrorCode::TurnCameraOnFailed, e))
                        }
                    };
                    store.dispatch(action);
                });
            }

            LocalUserAction::CameraOffTriggered => {
                self.spawn(store, |sdk, store| async move {
                    let action = match sdk.turn_camera_off().await {
                        Ok(()) => LocalUserAction::CameraOffSucceeded,
                        Err(e) => LocalUserAction::CameraOffFailed(failure(
                            ErrorCode::TurnCameraOffFailed,
                            e,
                        )),
                    };
                    store.dispatch(action);
                });
            }

            LocalUserAction::CameraSwitchTriggered => {
                let previous = state.local_user.camera.device;
                let target = match previous {
                    CameraDeviceSelectionStatus::Front => CameraDeviceSelectionStatus::Back,
                    CameraDeviceSelectionStatus::Back => CameraDeviceSelectionStatus::Front,
                    CameraDeviceSelectionStatus::Switching => {
                        tracing::debug!("Camera switch already in progress");
                        return;
                    }
                };
                self.spawn(store, move |sdk, store| async move {
                    let action = match sdk.switch_camera(target).await {
                        Ok(device) => LocalUserAction::CameraSwitchSucceeded(device),
                        Err(e) => LocalUserAction::CameraSwitchFailed {
                            previous,
                            error: failure(ErrorCode::SwitchCameraFailed, e),
                        },
                    };
                    store.dispatch(action);
                });
            }

            LocalUserAction::MicOnTriggered => {
                self.spawn(store, |sdk, store| async move {
                    let action = match sdk.turn_mic_on().await {
                        Ok(()) => LocalUserAction::MicOnSucceeded,
                        Err(e) => LocalUserAction::MicOnFailed(failure(ErrorCode::TurnMicOnFailed, e)),
                    };
                    store.dispatch(action);
                });
            }

            LocalUserAction::MicOffTriggered => {
                self.spawn(store, |sdk, store| async move {
                    let action = match sdk.turn_mic_off().await {
                        Ok(()) => LocalUserAction::MicOffSucceeded,
                        Err(e) => {
                            LocalUserAction::MicOffFailed(failure(ErrorCode::TurnMicOffFailed, e))
                        }
                    };
                    store.dispatch(action);
                });
            }

            _ => {}
        }
    }

    fn on_lifecycle(&self, store: &Store<AppState>, state: &AppState, action: &LifecycleAction) {
        match action {
            LifecycleAction::EnterBackgroundTriggered => {
                let pause = state.local_user.camera.operation == CameraOperationalStatus::On
                    && state.call.calling_status == CallingStatus::Connected;
                self.spawn(store, move |sdk, store| async move {
                    if pause {
                        match sdk.pause_camera().await {
                            Ok(()) => store.dispatch(LocalUserAction::CameraPauseSucceeded),
                            Err(e) => tracing::warn!("Failed to pause outgoing video: {}", e),
                        }
                    }
                    store.dispatch(LifecycleAction::EnterBackgroundSucceeded);
                });
            }

            LifecycleAction::EnterForegroundTriggered => {
                let resume = state.local_user.camera.operation == CameraOperationalStatus::Paused;
                self.spawn(store, move |sdk, store| async move {
                    if resume {
                        let action = match sdk.turn_camera_on().await {
                            Ok(stream) => LocalUserAction::CameraOnSucceeded(stream),
                            Err(e) => LocalUserAction::CameraOnFailed(failure(
                                ErrorCode::TurnCameraOnFailed,
                                e,
                            )),
                        };
                        store.dispatch(action);
                    }
                    store.dispatch(LifecycleAction::EnterForegroundSucceeded);
                });
            }

            _ => {}
        }
    }

    fn on_conversation(&self, store: &Store<AppState>, action: &Action) {
        match action {
            Action::Participant(ParticipantAction::FetchRequested) => {
                self.spawn(store, |sdk, store| async move {
                    match sdk.fetch_participants().await {
                        Ok(map) => store.dispatch(ParticipantAction::ListUpdated(map)),
                        Err(e) => tracing::warn!("Failed to fetch participants: {}", e),
                    }
                });
            }

            Action::Captions(CaptionsAction::StartRequested { language }) => {
                let language = language.clone();
                self.spawn(store, |sdk, store| async move {
                    let action = match sdk.start_captions(&language).await {
                        Ok(()) => CaptionsAction::Started { language },
                        Err(e) => CaptionsAction::Failed(failure(ErrorCode::CaptionsFailed, e)),
                    };
                    store.dispatch(action);
                });
            }

            Action::Captions(CaptionsAction::StopRequested) => {
                self.spawn(store, |sdk, store| async move {
                    let action = match sdk.stop_captions().await {
                        Ok(()) => CaptionsAction::Stopped,
                        Err(e) => CaptionsAction::Failed(failure(ErrorCode::CaptionsFailed, e)),
                    };
                    store.dispatch(action);
                });
            }

            Action::Chat(ChatAction::SendMessageRequested { content }) => {
                let content = content.clone();
                self.spawn(store, |sdk, store| async move {
                    let action = match sdk.send_message(&content).await {
                        Ok(message) => ChatAction::MessageSent(message),
                        Err(e) => {
                            ChatAction::SendMessageFailed(failure(ErrorCode::MessageSendFailed, e))
                        }
                    };
                    store.dispatch(action);
                });
            }

            _ => {}
        }
    }

    fn emergency_exit(&self, store: &Store<AppState>) {
        if self.exiting.swap(true, Ordering::SeqCst) {
            return;
        }
        tracing::info!("Emergency exit: tearing down call");
        self.shutdown();

        self.spawn(store, |sdk, store| async move {
            if let Err(e) = sdk.end_call().await {
                tracing::debug!("Ignoring end call failure during emergency exit: {}", e);
            }
            sdk.dispose().await;
            store.dispatch(NavigationAction::Exit);
        });
    }
}

impl Middleware<AppState> for CallingMiddleware {
    fn handle(&self, store: &Store<AppState>, action: Action, next: Next<'_, AppState>) {
        let state = store.current_state();

        match &action {
            Action::Calling(a) => self.on_calling(store, &state, a),
            Action::LocalUser(a) => self.on_local_user(store, &state, a),
            Action::Lifecycle(a) => self.on_lifecycle(store, &state, a),
            Action::Permission(PermissionAction::CameraPermissionSet(PermissionStatus::Denied))
                if state.local_user.camera.operation == CameraOperationalStatus::On =>
            {
                store.dispatch(LocalUserAction::CameraOffTriggered);
            }
            Action::Error(ErrorAction::EmergencyExit) => self.emergency_exit(store),
            Action::Participant(_) | Action::Captions(_) | Action::Chat(_) => {
                self.on_conversation(store, &action)
            }
            _ => {}
        }

        next.run(action);
    }
}

fn failure(code: ErrorCode, error: SdkError) -> CallCompositeError {
    tracing::warn!(?code, "SDK operation failed: {}", error);
    CallCompositeError::new(code, error)
}

fn fatal(store: &Store<AppState>, code: ErrorCode, error: SdkError) {
    tracing::error!(?code, "Fatal call error: {}", error);
    store.dispatch(ErrorAction::FatalErrorOccurred(CallCompositeError::new(
        code, error,
    )));
}

fn call_state_failure(store: &Store<AppState>, code: ErrorCode, error: SdkError) {
    tracing::warn!(?code, "Call state change failed: {}", error);
    store.dispatch(ErrorAction::CallStateErrorOccurred(CallStateError::new(code)));
}
