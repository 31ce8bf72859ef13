use std::sync::{Arc, Mutex};

use crate::error::AudioRoutingError;
use crate::redux::action::{Action, LocalUserAction};
use crate::redux::state::{AppState, AudioDeviceSelectionStatus};
use crate::redux::store::{Middleware, Next, Store};
use crate::sdk::AudioRouter;
use crate::types::{CallCompositeError, ErrorCode};

/// Route used when bluetooth goes away and nothing was routed before it
const FALLBACK_ROUTE: AudioDeviceSelectionStatus = AudioDeviceSelectionStatus::ReceiverSelected;

/// Audio routing middleware
///
/// Executes `AudioDeviceChangeRequested` against the platform router and
/// reports the outcome. Follows bluetooth availability: switches to a
/// headset when one connects and goes back to the previous route when it
/// disconnects.
pub struct AudioMiddleware {
    router: Arc<dyn AudioRouter>,
    previous: Mutex<Option<AudioDeviceSelectionStatus>>,
}

impl AudioMiddleware {
    pub fn new(router: Arc<dyn AudioRouter>) -> Self {
        Self {
            router,
            previous: Mutex::new(None),
        }
    }

    fn change_device(&self, store: &Store<AppState>, requested: AudioDeviceSelectionStatus) {
        let state = store.current_state();
        let current = state.local_user.audio.device;

        let routed = if requested.is_bluetooth() && !state.local_user.audio.bluetooth.available {
            Err(AudioRoutingError::Unavailable("no bluetooth headset connected".to_string()))
        } else {
            self.router.route_to(requested.device())
        };

        match routed {
            Ok(()) => {
                store.dispatch(LocalUserAction::AudioDeviceChangeSucceeded(requested.selected()));
            }
            Err(e) => {
                tracing::warn!(device = ?requested.device(), "Audio route change failed: {}", e);
                store.dispatch(LocalUserAction::AudioDeviceChangeFailed {
                    previous: current.selected(),
                    error: CallCompositeError::new(ErrorCode::AudioDeviceChangeFailed, e),
                });
            }
        }
    }

    fn bluetooth_changed(&self, store: &Store<AppState>, available: bool) {
        let current = store.current_state().local_user.audio.device;
        let mut previous = self
            .previous
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if available && !current.is_bluetooth() {
            *previous = Some(current.selected());
            tracing::info!("Bluetooth headset connected, switching audio route");
            store.dispatch(LocalUserAction::AudioDeviceChangeRequested(
                AudioDeviceSelectionStatus::BluetoothScoSelected,
            ));
        } else if !available && current.is_bluetooth() {
            let restore = previous.take().unwrap_or(FALLBACK_ROUTE);
            tracing::info!(route = ?restore.device(), "Bluetooth headset lost, restoring audio route");
            store.dispatch(LocalUserAction::AudioDeviceChangeRequested(restore));
        }
    }
}

impl Middleware<AppState> for AudioMiddleware {
    fn handle(&self, store: &Store<AppState>, action: Action, next: Next<'_, AppState>) {
        match &action {
            Action::LocalUser(LocalUserAction::AudioDeviceChangeRequested(requested)) => {
                self.change_device(store, *requested);
            }
            Action::LocalUser(LocalUserAction::AudioDeviceBluetoothScoAvailable {
                available, ..
            }) => {
                self.bluetooth_changed(store, *available);
            }
            _ => {}
        }

        next.run(action);
    }
}
