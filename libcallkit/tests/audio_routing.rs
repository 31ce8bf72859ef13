//! Audio routing through a full session: explicit route changes, bluetooth
//! headsets coming and going, and router failures.

use std::sync::Arc;
use std::time::Duration;

use libcallkit::composite::{CallComposite, Collaborators, CompositeSession};
use libcallkit::handler::EventHandlers;
use libcallkit::redux::action::LocalUserAction;
use libcallkit::redux::state::{AppState, AudioDevice, AudioDeviceSelectionStatus};
use libcallkit::sdk::mock::{MockAudioRouter, MockCallingSdk};
use libcallkit::types::ErrorCode;
use libcallkit::CallConfiguration;
use tokio::time::timeout;

fn launch(router: Arc<MockAudioRouter>) -> (CallComposite, Arc<CompositeSession>) {
    let sdk = Arc::new(MockCallingSdk::new());
    let composite = CallComposite::new();
    let session = composite.launch(
        CallConfiguration::builder("token").build(),
        Collaborators {
            sdk: sdk.clone(),
            audio_router: router,
            directory: sdk,
            handlers: EventHandlers::new(),
        },
    );
    (composite, session)
}

async fn settled(session: &CompositeSession) -> Arc<AppState> {
    timeout(Duration::from_secs(2), session.store().settle())
        .await
        .expect("store did not settle");
    session.current_state()
}

fn headset(available: bool) -> LocalUserAction {
    LocalUserAction::AudioDeviceBluetoothScoAvailable {
        available,
        device_name: available.then(|| "Headset".to_string()),
    }
}

#[tokio::test]
async fn test_bluetooth_switch_and_restore() {
    let router = Arc::new(MockAudioRouter::new());
    let (_composite, session) = launch(router.clone());
    settled(&session).await;

    session.dispatch(headset(true));
    let state = settled(&session).await;
    assert_eq!(
        state.local_user.audio.device,
        AudioDeviceSelectionStatus::BluetoothScoSelected
    );
    assert_eq!(
        state.local_user.audio.bluetooth.device_name.as_deref(),
        Some("Headset")
    );

    session.dispatch(headset(false));
    let state = settled(&session).await;
    assert_eq!(
        state.local_user.audio.device,
        AudioDeviceSelectionStatus::SpeakerSelected
    );

    assert_eq!(
        router.routes(),
        vec![
            AudioDevice::Speaker,
            AudioDevice::BluetoothSco,
            AudioDevice::Speaker
        ]
    );
}

#[tokio::test]
async fn test_bluetooth_restores_user_choice() {
    let router = Arc::new(MockAudioRouter::new());
    let (_composite, session) = launch(router);
    settled(&session).await;

    session.dispatch(LocalUserAction::AudioDeviceChangeRequested(
        AudioDeviceSelectionStatus::ReceiverSelected,
    ));
    settled(&session).await;
    session.dispatch(headset(true));
    settled(&session).await;
    session.dispatch(headset(false));

    let state = settled(&session).await;
    assert_eq!(
        state.local_user.audio.device,
        AudioDeviceSelectionStatus::ReceiverSelected
    );
    assert!(!state.local_user.audio.bluetooth.available);
}

#[tokio::test]
async fn test_bluetooth_route_failure_keeps_previous_route() {
    let router = Arc::new(MockAudioRouter::new());
    router.fail_for(AudioDevice::BluetoothSco);
    let (_composite, session) = launch(router);
    settled(&session).await;

    session.dispatch(headset(true));
    let state = settled(&session).await;

    assert_eq!(
        state.local_user.audio.device,
        AudioDeviceSelectionStatus::SpeakerSelected
    );
    assert_eq!(
        state.local_user.audio.error.as_ref().map(|e| e.code),
        Some(ErrorCode::AudioDeviceChangeFailed)
    );
}

#[tokio::test]
async fn test_headset_gone_before_switch_completes() {
    let router = Arc::new(MockAudioRouter::new());
    let (_composite, session) = launch(router.clone());
    settled(&session).await;

    // The switch request is queued behind the disconnect
    session.dispatch(headset(true));
    session.dispatch(headset(false));

    let state = settled(&session).await;
    assert_eq!(
        state.local_user.audio.device,
        AudioDeviceSelectionStatus::SpeakerSelected
    );
    assert_eq!(router.routes(), vec![AudioDevice::Speaker]);
}
