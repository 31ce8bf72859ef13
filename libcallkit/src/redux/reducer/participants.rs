use crate::redux::action::{Action, ParticipantAction};
use crate::redux::state::RemoteParticipantsState;

/// Remote participant roster reducer
///
/// Timestamps are counters bumped only when content actually changes, so a
/// republished but identical roster does not look like a change downstream.
pub fn reduce(state: RemoteParticipantsState, action: &Action) -> RemoteParticipantsState {
    let Action::Participant(action) = action else {
        return state;
    };

    match action {
        ParticipantAction::ListUpdated(map) if *map != state.participant_map => {
            RemoteParticipantsState {
                participant_map: map.clone(),
                modified_timestamp: state.modified_timestamp + 1,
                ..state
            }
        }
        ParticipantAction::DominantSpeakersUpdated(ids) if *ids != state.dominant_speakers => {
            RemoteParticipantsState {
                dominant_speakers: ids.clone(),
                dominant_speakers_modified_timestamp: state.dominant_speakers_modified_timestamp
                    + 1,
                ..state
            }
        }
        ParticipantAction::ListUpdated(_)
        | ParticipantAction::DominantSpeakersUpdated(_)
        | ParticipantAction::FetchRequested => state,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ParticipantInfoModel;
    use std::collections::BTreeMap;

    fn roster(ids: &[&str]) -> BTreeMap<String, ParticipantInfoModel> {
        ids.iter()
            .map(|id| (id.to_string(), ParticipantInfoModel::new(*id, id.to_uppercase())))
            .collect()
    }

    #[test]
    fn test_membership_change_bumps_timestamp() {
        let state = reduce(
            RemoteParticipantsState::default(),
            &ParticipantAction::ListUpdated(roster(&["a", "b"])).into(),
        );
        assert_eq!(state.modified_timestamp, 1);

        let state = reduce(state, &ParticipantAction::ListUpdated(roster(&["b", "c"])).into());
        assert_eq!(state.modified_timestamp, 2);
        assert!(state.participant_map.contains_key("c"));
    }

    #[test]
    fn test_field_change_bumps_timestamp() {
        let state = reduce(
            RemoteParticipantsState::default(),
            &ParticipantAction::ListUpdated(roster(&["a"])).into(),
        );

        let mut muted = roster(&["a"]);
        muted.get_mut("a").unwrap().is_muted = true;
        let state = reduce(state, &ParticipantAction::ListUpdated(muted).into());

        assert_eq!(state.modified_timestamp, 2);
        assert!(state.participant_map["a"].is_muted);
    }

    #[test]
    fn test_identical_roster_keeps_timestamp() {
        let state = reduce(
            RemoteParticipantsState::default(),
            &ParticipantAction::ListUpdated(roster(&["a", "b"])).into(),
        );
        let again = reduce(
            state.clone(),
            &ParticipantAction::ListUpdated(roster(&["a", "b"])).into(),
        );
        assert_eq!(again, state);
        assert_eq!(again.modified_timestamp, 1);
    }

    #[test]
    fn test_dominant_speakers() {
        let state = reduce(
            RemoteParticipantsState::default(),
            &ParticipantAction::DominantSpeakersUpdated(vec!["b".to_string()]).into(),
        );
        assert_eq!(state.dominant_speakers, vec!["b"]);
        assert_eq!(state.dominant_speakers_modified_timestamp, 1);
        assert_eq!(state.modified_timestamp, 0);
    }
}
