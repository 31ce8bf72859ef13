//! State-change coordinators and host event callbacks
//!
//! Coordinators watch the store's state stream and turn state transitions
//! into host notifications (errors, joined participants, call state,
//! navigation) or follow-up actions (emergency exit). Each one runs in its
//! own task and only ever sees committed states.
//!
//! Host callbacks are registered on [`EventHandlers`]. A panicking callback
//! is logged and skipped; it never takes a coordinator down.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, RwLock};

use tokio::task::JoinHandle;

use crate::redux::state::{AppState, CallingStatus, NavigationStatus};
use crate::redux::store::Store;
use crate::types::{CallCompositeError, CommunicationIdentifier};

pub mod call_state;
pub mod error;
pub mod navigation;
pub mod participants;

pub use call_state::CallStateNotifier;
pub use error::ErrorHandler;
pub use navigation::NavigationRouter;
pub use participants::RemoteParticipantNotifier;

/// Remote participants that joined since the last notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteParticipantJoinedEvent {
    pub identifiers: Vec<CommunicationIdentifier>,
}

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

#[derive(Default)]
struct Registry {
    error: Vec<Callback<CallCompositeError>>,
    remote_participant_joined: Vec<Callback<RemoteParticipantJoinedEvent>>,
    call_state_changed: Vec<Callback<CallingStatus>>,
    navigation: Vec<Callback<NavigationStatus>>,
    exit: Vec<Callback<()>>,
}

/// Host callback registry, shared by every coordinator of a session
#[derive(Clone, Default)]
pub struct EventHandlers {
    registry: Arc<RwLock<Registry>>,
}

impl EventHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_on_error(&self, handler: impl Fn(&CallCompositeError) + Send + Sync + 'static) {
        self.write().error.push(Arc::new(handler));
    }

    pub fn add_on_remote_participant_joined(
        &self,
        handler: impl Fn(&RemoteParticipantJoinedEvent) + Send + Sync + 'static,
    ) {
        self.write().remote_participant_joined.push(Arc::new(handler));
    }

    pub fn add_on_call_state_changed(
        &self,
        handler: impl Fn(&CallingStatus) + Send + Sync + 'static,
    ) {
        self.write().call_state_changed.push(Arc::new(handler));
    }

    pub fn add_on_navigation(&self, handler: impl Fn(&NavigationStatus) + Send + Sync + 'static) {
        self.write().navigation.push(Arc::new(handler));
    }

    pub fn add_on_exit(&self, handler: impl Fn() + Send + Sync + 'static) {
        self.write().exit.push(Arc::new(move |_: &()| handler()));
    }

    pub fn notify_error(&self, error: &CallCompositeError) {
        let handlers = self.read().error.clone();
        invoke("error", &handlers, error);
    }

    pub fn notify_remote_participant_joined(&self, event: &RemoteParticipantJoinedEvent) {
        let handlers = self.read().remote_participant_joined.clone();
        invoke("remote_participant_joined", &handlers, event);
    }

    pub fn notify_call_state_changed(&self, status: CallingStatus) {
        let handlers = self.read().call_state_changed.clone();
        invoke("call_state_changed", &handlers, &status);
    }

    pub fn notify_navigation(&self, status: NavigationStatus) {
        let handlers = self.read().navigation.clone();
        invoke("navigation", &handlers, &status);
    }

    pub fn notify_exit(&self) {
        let handlers = self.read().exit.clone();
        invoke("exit", &handlers, &());
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Registry> {
        self.registry
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Registry> {
        self.registry
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

// Handlers are cloned out of the lock first so a callback may register more
fn invoke<T>(kind: &'static str, handlers: &[Callback<T>], event: &T) {
    for handler in handlers {
        if panic::catch_unwind(AssertUnwindSafe(|| handler(event))).is_err() {
            tracing::warn!(handler = kind, "Event handler panicked, continuing");
        }
    }
}

/// Reacts to committed states
pub trait StateObserver: Send + 'static {
    fn on_state(&mut self, state: &AppState);
}

/// Run `observer` over the store's states until the store is disposed or
/// the returned task is aborted.
pub fn spawn_observer<O: StateObserver>(store: &Store<AppState>, mut observer: O) -> JoinHandle<()> {
    let mut subscription = store.subscribe();
    tokio::spawn(async move {
        while let Some(state) = subscription.next().await {
            observer.on_state(&state);
        }
    })
}
