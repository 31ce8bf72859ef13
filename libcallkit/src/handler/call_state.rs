use crate::redux::state::{AppState, CallingStatus};

use super::{EventHandlers, StateObserver};

/// Reports each change of the call's status to the host
pub struct CallStateNotifier {
    handlers: EventHandlers,
    last: CallingStatus,
}

impl CallStateNotifier {
    pub fn new(handlers: EventHandlers) -> Self {
        Self {
            handlers,
            last: CallingStatus::None,
        }
    }
}

impl StateObserver for CallStateNotifier {
    fn on_state(&mut self, state: &AppState) {
        let status = state.call.calling_status;
        if status == self.last {
            return;
        }
        self.last = status;
        tracing::info!(?status, "Call state changed");
        self.handlers.notify_call_state_changed(status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn with_status(status: CallingStatus) -> AppState {
        let mut state = AppState::default();
        state.call.calling_status = status;
        state
    }

    #[test]
    fn test_reports_distinct_statuses() {
        let handlers = EventHandlers::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        handlers.add_on_call_state_changed(move |status| sink.lock().unwrap().push(*status));

        let mut notifier = CallStateNotifier::new(handlers);
        for status in [
            CallingStatus::None,
            CallingStatus::Connecting,
            CallingStatus::Connecting,
            CallingStatus::Connected,
        ] {
            notifier.on_state(&with_status(status));
        }

        assert_eq!(
            *seen.lock().unwrap(),
            vec![CallingStatus::Connecting, CallingStatus::Connected]
        );
    }
}
