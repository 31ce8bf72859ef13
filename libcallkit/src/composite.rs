//! Composite sessions
//!
//! A [`CompositeSession`] is one launched call UI: its store, middlewares,
//! coordinators and persona cache. [`CallComposite`] keeps the sessions it
//! launched, keyed by [`InstanceId`], until they are disposed.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use libcallkit::composite::{CallComposite, Collaborators};
//! use libcallkit::config::CallConfiguration;
//! use libcallkit::handler::EventHandlers;
//! use libcallkit::sdk::mock::{MockAudioRouter, MockCallingSdk};
//!
//! # async fn example() -> libcallkit::Result<()> {
//! let sdk = Arc::new(MockCallingSdk::new());
//! let handlers = EventHandlers::new();
//! handlers.add_on_exit(|| println!("call UI closed"));
//!
//! let composite = CallComposite::new();
//! let session = composite.launch(
//!     CallConfiguration::builder("token").display_name("Ada").build(),
//!     Collaborators {
//!         sdk: sdk.clone(),
//!         audio_router: Arc::new(MockAudioRouter::new()),
//!         directory: sdk,
//!         handlers,
//!     },
//! );
//!
//! composite.dispose(&session.id())?;
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::task::JoinHandle;

use crate::config::CallConfiguration;
use crate::error::{CallkitError, Result};
use crate::handler::{
    spawn_observer, CallStateNotifier, ErrorHandler, EventHandlers, NavigationRouter,
    RemoteParticipantNotifier,
};
use crate::persona::ParticipantViewDataCache;
use crate::redux::action::{Action, CallingAction, LocalUserAction};
use crate::redux::middleware::{AudioMiddleware, CallingMiddleware};
use crate::redux::reducer::reduce;
use crate::redux::store::{Middleware, StateSubscription};
use crate::redux::{AppState, AppStore};
use crate::sdk::{AudioRouter, CallingSdk, ParticipantDirectory};
use crate::types::InstanceId;

/// External collaborators a session is wired to
pub struct Collaborators {
    pub sdk: Arc<dyn CallingSdk>,
    pub audio_router: Arc<dyn AudioRouter>,
    pub directory: Arc<dyn ParticipantDirectory>,
    pub handlers: EventHandlers,
}

pub struct CompositeSession {
    id: InstanceId,
    store: AppStore,
    view_data: ParticipantViewDataCache,
    calling: Arc<CallingMiddleware>,
    coordinators: Mutex<Vec<JoinHandle<()>>>,
}

impl CompositeSession {
    /// Build the session and start its coordinators. Nothing is dispatched.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(config: &CallConfiguration, collaborators: Collaborators) -> Self {
        let Collaborators {
            sdk,
            audio_router,
            directory,
            handlers,
        } = collaborators;

        let calling = Arc::new(CallingMiddleware::new(sdk, config.skip_setup_screen));
        let middlewares: Vec<Arc<dyn Middleware<AppState>>> = vec![
            Arc::clone(&calling) as Arc<dyn Middleware<AppState>>,
            Arc::new(AudioMiddleware::new(audio_router)),
        ];
        let store = AppStore::new(
            AppState::new(config),
            reduce,
            middlewares,
            config.state_buffer,
        );
        let view_data = ParticipantViewDataCache::new(store.clone());

        let coordinators = vec![
            spawn_observer(&store, ErrorHandler::new(store.clone(), handlers.clone())),
            spawn_observer(
                &store,
                RemoteParticipantNotifier::new(
                    handlers.clone(),
                    directory,
                    view_data.clone(),
                    config.join_notification,
                ),
            ),
            spawn_observer(&store, CallStateNotifier::new(handlers.clone())),
            spawn_observer(&store, NavigationRouter::new(handlers)),
        ];

        Self {
            id: InstanceId::new(),
            store,
            view_data,
            calling,
            coordinators: Mutex::new(coordinators),
        }
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn store(&self) -> &AppStore {
        &self.store
    }

    pub fn dispatch(&self, action: impl Into<Action>) {
        self.store.dispatch(action);
    }

    pub fn current_state(&self) -> Arc<AppState> {
        self.store.current_state()
    }

    pub fn subscribe(&self) -> StateSubscription<AppState> {
        self.store.subscribe()
    }

    pub fn view_data(&self) -> &ParticipantViewDataCache {
        &self.view_data
    }

    /// Stop coordinators and the SDK event bridge, then dispose the store.
    /// Idempotent.
    pub fn dispose(&self) {
        for handle in self.coordinators().drain(..) {
            handle.abort();
        }
        self.calling.shutdown();
        self.store.dispose();
    }

    pub fn is_disposed(&self) -> bool {
        self.store.is_disposed()
    }

    fn coordinators(&self) -> MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.coordinators
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Registry of launched sessions
#[derive(Default)]
pub struct CallComposite {
    sessions: Mutex<HashMap<InstanceId, Arc<CompositeSession>>>,
}

impl CallComposite {
    pub fn new() -> Self {
        Self::default()
    }

    /// Launch a session: apply the default audio route and begin call setup.
    ///
    /// Must be called from within a tokio runtime.
    pub fn launch(
        &self,
        config: CallConfiguration,
        collaborators: Collaborators,
    ) -> Arc<CompositeSession> {
        let session = Arc::new(CompositeSession::new(&config, collaborators));
        tracing::info!(instance = %session.id(), "Launching call composite");

        session.dispatch(LocalUserAction::AudioDeviceChangeRequested(
            config.default_audio_device,
        ));
        session.dispatch(CallingAction::SetupCall);

        self.sessions().insert(session.id(), Arc::clone(&session));
        session
    }

    pub fn session(&self, id: &InstanceId) -> Option<Arc<CompositeSession>> {
        self.sessions().get(id).cloned()
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions().len()
    }

    /// Dispose a session and forget it
    ///
    /// # Errors
    ///
    /// Returns `CallkitError::Session` if no session with this id exists.
    pub fn dispose(&self, id: &InstanceId) -> Result<()> {
        let session = self
            .sessions()
            .remove(id)
            .ok_or_else(|| CallkitError::Session(format!("No session with id {}", id)))?;

        session.dispose();
        tracing::info!(instance = %id, "Call composite disposed");
        Ok(())
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<InstanceId, Arc<CompositeSession>>> {
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdk::mock::{MockAudioRouter, MockCallingSdk};

    fn collaborators() -> Collaborators {
        let sdk = Arc::new(MockCallingSdk::new());
        Collaborators {
            sdk: sdk.clone(),
            audio_router: Arc::new(MockAudioRouter::new()),
            directory: sdk,
            handlers: EventHandlers::new(),
        }
    }

    #[tokio::test]
    async fn test_launch_and_dispose() {
        let composite = CallComposite::new();
        let session = composite.launch(CallConfiguration::builder("token").build(), collaborators());
        assert_eq!(composite.active_sessions(), 1);
        assert!(composite.session(&session.id()).is_some());

        composite.dispose(&session.id()).unwrap();
        assert_eq!(composite.active_sessions(), 0);
        assert!(session.is_disposed());
    }

    #[tokio::test]
    async fn test_dispose_unknown_session() {
        let composite = CallComposite::new();
        let result = composite.dispose(&InstanceId::new());
        assert!(matches!(result, Err(CallkitError::Session(_))));
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let composite = CallComposite::new();
        let first = composite.launch(CallConfiguration::builder("a").build(), collaborators());
        let second = composite.launch(CallConfiguration::builder("b").build(), collaborators());

        composite.dispose(&first.id()).unwrap();
        first.dispatch(CallingAction::HoldRequested);

        assert!(!second.is_disposed());
        assert_eq!(composite.active_sessions(), 1);
    }
}
