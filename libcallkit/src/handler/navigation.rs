use crate::redux::state::{AppState, NavigationStatus};

use super::{EventHandlers, StateObserver};

/// Tells the host which screen to show, and when the composite is done
pub struct NavigationRouter {
    handlers: EventHandlers,
    last: NavigationStatus,
    exited: bool,
}

impl NavigationRouter {
    pub fn new(handlers: EventHandlers) -> Self {
        Self {
            handlers,
            last: NavigationStatus::None,
            exited: false,
        }
    }
}

impl StateObserver for NavigationRouter {
    fn on_state(&mut self, state: &AppState) {
        let status = state.navigation.status;
        if status == self.last {
            return;
        }
        self.last = status;
        tracing::debug!(?status, "Navigating");
        self.handlers.notify_navigation(status);

        if status == NavigationStatus::Exit && !self.exited {
            self.exited = true;
            tracing::info!("Composite exited");
            self.handlers.notify_exit();
        }
    }
}
