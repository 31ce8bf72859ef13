//! Participant persona data supplied by the host
//!
//! The host can attach a display name and avatar to the local user and to
//! any remote participant currently in the call. Entries for participants
//! who leave are released by the participant notifier.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::redux::state::AppState;
use crate::redux::store::Store;
use crate::types::{CommunicationIdentifier, ParticipantViewData};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetViewDataResult {
    Success,
    ParticipantNotInCall,
}

#[derive(Clone)]
pub struct ParticipantViewDataCache {
    store: Store<AppState>,
    remote: Arc<RwLock<HashMap<String, ParticipantViewData>>>,
    local: Arc<RwLock<Option<ParticipantViewData>>>,
}

impl ParticipantViewDataCache {
    pub fn new(store: Store<AppState>) -> Self {
        Self {
            store,
            remote: Arc::new(RwLock::new(HashMap::new())),
            local: Arc::new(RwLock::new(None)),
        }
    }

    /// Attach persona data to a remote participant in the current roster
    pub fn set_participant_view_data(
        &self,
        identifier: &CommunicationIdentifier,
        data: ParticipantViewData,
    ) -> SetViewDataResult {
        let id = identifier.raw_id();
        if !self
            .store
            .current_state()
            .remote_participants
            .participant_map
            .contains_key(id)
        {
            return SetViewDataResult::ParticipantNotInCall;
        }

        self.remote
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(id.to_string(), data);
        SetViewDataResult::Success
    }

    pub fn participant_view_data(&self, participant_id: &str) -> Option<ParticipantViewData> {
        self.remote
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(participant_id)
            .cloned()
    }

    pub fn remove_participant_view_data(&self, participant_id: &str) {
        let removed = self
            .remote
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(participant_id);
        if removed.is_some() {
            tracing::debug!(participant = participant_id, "Released participant view data");
        }
    }

    pub fn set_local_view_data(&self, data: ParticipantViewData) {
        *self.local.write().unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(data);
    }

    pub fn local_view_data(&self) -> Option<ParticipantViewData> {
        self.local
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::redux::action::ParticipantAction;
    use crate::redux::reducer::reduce;
    use crate::types::ParticipantInfoModel;
    use std::collections::BTreeMap;

    fn view_data(name: &str) -> ParticipantViewData {
        ParticipantViewData {
            display_name: Some(name.to_string()),
            avatar: None,
        }
    }

    #[tokio::test]
    async fn test_set_view_data_requires_participant_in_call() {
        let store = Store::new(AppState::default(), reduce, Vec::new(), 16);
        let cache = ParticipantViewDataCache::new(store.clone());
        let alice = CommunicationIdentifier::CommunicationUser("alice".to_string());

        assert_eq!(
            cache.set_participant_view_data(&alice, view_data("Alice")),
            SetViewDataResult::ParticipantNotInCall
        );

        let mut roster = BTreeMap::new();
        roster.insert("alice".to_string(), ParticipantInfoModel::new("alice", "alice"));
        store.dispatch(ParticipantAction::ListUpdated(roster));
        store.settle().await;

        assert_eq!(
            cache.set_participant_view_data(&alice, view_data("Alice")),
            SetViewDataResult::Success
        );
        assert_eq!(cache.participant_view_data("alice"), Some(view_data("Alice")));

        cache.remove_participant_view_data("alice");
        assert!(cache.participant_view_data("alice").is_none());
    }

    #[tokio::test]
    async fn test_local_view_data() {
        let store = Store::new(AppState::default(), reduce, Vec::new(), 16);
        let cache = ParticipantViewDataCache::new(store);
        assert!(cache.local_view_data().is_none());

        cache.set_local_view_data(view_data("Me"));
        assert_eq!(cache.local_view_data(), Some(view_data("Me")));
    }
}
