//! callkit-sim - Drive a callkit session through scripted call scenarios
//!
//! Runs against the in-process mock SDK and audio router, printing every
//! published state and every host notification on stdout.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use libcallkit::composite::{CallComposite, Collaborators, CompositeSession};
use libcallkit::config::CallTarget;
use libcallkit::logging::{LogFormat, LoggingConfig};
use libcallkit::redux::action::{CallingAction, ChatAction, LocalUserAction};
use libcallkit::redux::state::{CallingStatus, NavigationStatus};
use libcallkit::sdk::mock::{MockAudioRouter, MockCallingSdk};
use libcallkit::sdk::SdkEvent;
use libcallkit::types::{
    CallCompositeEventCode, CallStateError, ErrorCode, ParticipantInfoModel,
};
use libcallkit::{AppState, CallConfiguration, CallkitError, Config, EventHandlers};
use serde_json::json;
use tokio::sync::mpsc;
use tokio::time::timeout;

/// How long a scenario step may take before the run is abandoned
const STEP_TIMEOUT: Duration = Duration::from_secs(5);

/// Host notifications a scenario waits for before the session is disposed
type Expected = &'static [&'static str];

#[derive(Parser, Debug)]
#[command(name = "callkit-sim")]
#[command(version, about = "Run scripted call scenarios against a simulated calling SDK")]
#[command(long_about = r#"Run scripted call scenarios against a simulated calling SDK.

Every state the store publishes is printed as one line on stdout, together
with the notifications a host application would receive (errors, call
state changes, joined participants, exit).

EXAMPLES:
    # Setup screen, join, camera, chat, hang up
    callkit-sim --scenario basic

    # A bluetooth headset connects mid-call and disconnects again
    callkit-sim --scenario bluetooth --format json | jq '.state.local_user.audio'

    # The access token expires during the call
    callkit-sim --scenario token-expired

EXIT CODES:
    0 - Scenario ran to completion
    1 - Configuration or session error
    3 - Invalid input (empty access token)
"#)]
struct Cli {
    /// Scenario to run
    #[arg(short, long, value_enum, default_value_t = Scenario::Basic)]
    scenario: Scenario,

    /// Path to a config file (defaults to the XDG location)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Access token handed to the session
    #[arg(long, env = "CALLKIT_ACCESS_TOKEN", hide_env_values = true, default_value = "simulator")]
    token: String,

    /// Display name of the local user
    #[arg(long, default_value = "Simulator")]
    display_name: String,

    /// Simulated SDK latency per operation, in milliseconds
    #[arg(long, default_value = "0", value_name = "MS")]
    latency_ms: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Scenario {
    /// Setup screen, join, camera, participants, chat, hang up
    Basic,
    /// Bluetooth headset connects and disconnects during a call
    Bluetooth,
    /// The call drops with an expired token
    TokenExpired,
    /// The call is declined by the callee
    Declined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_format = match cli.format {
        OutputFormat::Json => LogFormat::Json,
        OutputFormat::Text => LogFormat::Text,
    };
    LoggingConfig::new(log_format, "warn".to_string(), cli.verbose).init();

    tracing::debug!(scenario = ?cli.scenario, format = ?cli.format, "callkit-sim started");

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        let code = e
            .downcast_ref::<CallkitError>()
            .map(CallkitError::exit_code)
            .unwrap_or(1);
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> Result<()> {
    if cli.token.trim().is_empty() {
        return Err(CallkitError::InvalidInput("access token is empty".to_string()).into());
    }

    let config = match &cli.config {
        Some(path) => Config::load_from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load().context("Failed to load configuration")?,
    };

    let call_config = CallConfiguration::from_config(
        &config,
        cli.token.clone(),
        CallTarget::GroupCall(uuid::Uuid::new_v4()),
    )
    .display_name(cli.display_name.clone())
    .build();

    let sdk = Arc::new(if cli.latency_ms > 0 {
        MockCallingSdk::with_delay(Duration::from_millis(cli.latency_ms))
    } else {
        MockCallingSdk::new()
    });
    let router = Arc::new(MockAudioRouter::new());
    let printer = Printer { format: cli.format };
    let (handlers, mut notifications) = host_handlers(printer);

    let composite = CallComposite::new();
    let session = composite.launch(
        call_config,
        Collaborators {
            sdk: sdk.clone(),
            audio_router: router,
            directory: sdk.clone(),
            handlers,
        },
    );
    tracing::info!(session = %session.id(), scenario = ?cli.scenario, "Session launched");

    let mut subscription = session.subscribe();
    let output = tokio::spawn(async move {
        let mut seq = 0u64;
        while let Some(state) = subscription.next().await {
            printer.state(seq, &state);
            seq += 1;
        }
    });

    let outcome = match cli.scenario {
        Scenario::Basic => basic(&session, &sdk).await,
        Scenario::Bluetooth => bluetooth(&session).await,
        Scenario::TokenExpired => token_expired(&session, &sdk).await,
        Scenario::Declined => declined(&session, &sdk).await,
    };
    let outcome = match outcome {
        Ok(expected) => await_notifications(&mut notifications, expected).await,
        Err(e) => Err(e),
    };

    composite.dispose(&session.id())?;
    output.await.context("State printer failed")?;
    outcome
}

/// Host callbacks that print each notification and report its name
fn host_handlers(printer: Printer) -> (EventHandlers, mpsc::UnboundedReceiver<&'static str>) {
    let handlers = EventHandlers::new();
    let (tx, rx) = mpsc::unbounded_channel();

    let sent = tx.clone();
    handlers.add_on_error(move |e| {
        printer.event("error", json!({ "code": e.code, "message": e.to_string() }));
        let _ = sent.send("error");
    });
    let sent = tx.clone();
    handlers.add_on_call_state_changed(move |status| {
        printer.event("call_state", json!({ "status": status }));
        let _ = sent.send("call_state");
    });
    let sent = tx.clone();
    handlers.add_on_remote_participant_joined(move |event| {
        let ids: Vec<&str> = event.identifiers.iter().map(|id| id.raw_id()).collect();
        printer.event("participants_joined", json!({ "identifiers": ids }));
        let _ = sent.send("participants_joined");
    });
    handlers.add_on_exit(move || {
        printer.event("exit", json!({}));
        let _ = tx.send("exit");
    });

    (handlers, rx)
}

/// Wait until every expected notification has reached the host callbacks
async fn await_notifications(
    notifications: &mut mpsc::UnboundedReceiver<&'static str>,
    expected: &[&'static str],
) -> Result<()> {
    let mut missing: Vec<&str> = expected.to_vec();
    while !missing.is_empty() {
        match timeout(STEP_TIMEOUT, notifications.recv()).await {
            Ok(Some(name)) => missing.retain(|m| *m != name),
            Ok(None) | Err(_) => {
                return Err(CallkitError::Session(format!(
                    "host never notified: {}",
                    missing.join(", ")
                ))
                .into());
            }
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy)]
struct Printer {
    format: OutputFormat,
}

impl Printer {
    fn state(&self, seq: u64, state: &AppState) {
        match self.format {
            OutputFormat::Json => {
                println!("{}", json!({ "seq": seq, "state": state }));
            }
            OutputFormat::Text => {
                println!(
                    "state #{} | nav={:?} call={:?} camera={:?} mic={:?} audio={:?} participants={} messages={}",
                    seq,
                    state.navigation.status,
                    state.call.calling_status,
                    state.local_user.camera.operation,
                    state.local_user.audio.operation,
                    state.local_user.audio.device.device(),
                    state.remote_participants.participant_map.len(),
                    state.chat.messages.len(),
                );
            }
        }
    }

    fn event(&self, name: &str, payload: serde_json::Value) {
        match self.format {
            OutputFormat::Json => {
                println!("{}", json!({ "event": name, "payload": payload }));
            }
            OutputFormat::Text => {
                println!("event | {} {}", name, payload);
            }
        }
    }
}

async fn wait_until(
    session: &CompositeSession,
    what: &str,
    predicate: impl Fn(&AppState) -> bool,
) -> Result<Arc<AppState>> {
    match timeout(STEP_TIMEOUT, session.store().wait_for(predicate)).await {
        Ok(Some(state)) => Ok(state),
        Ok(None) => Err(CallkitError::Session(format!("session closed while waiting for {}", what)).into()),
        Err(_) => Err(CallkitError::Session(format!("timed out waiting for {}", what)).into()),
    }
}

async fn join(session: &CompositeSession) -> Result<()> {
    let state = session.current_state();
    if state.navigation.status != NavigationStatus::InCall {
        wait_until(session, "setup screen", |s| {
            s.navigation.status == NavigationStatus::Setup
                || s.navigation.status == NavigationStatus::InCall
        })
        .await?;
        if session.current_state().navigation.status == NavigationStatus::Setup {
            session.dispatch(CallingAction::CallStartRequested);
        }
    }
    wait_until(session, "connected call", |s| {
        s.call.calling_status == CallingStatus::Connected
            && s.navigation.status == NavigationStatus::InCall
    })
    .await?;
    Ok(())
}

fn roster(names: &[&str]) -> BTreeMap<String, ParticipantInfoModel> {
    names
        .iter()
        .map(|name| {
            let id = format!("8:acs:{}", name.to_lowercase());
            (id.clone(), ParticipantInfoModel::new(id, *name))
        })
        .collect()
}

async fn basic(session: &CompositeSession, sdk: &MockCallingSdk) -> Result<Expected> {
    join(session).await?;

    session.dispatch(LocalUserAction::CameraOnRequested);
    wait_until(session, "camera on", |s| s.local_user.video_stream_id.is_some()).await?;

    sdk.set_participants(roster(&["Ada", "Grace"]));
    wait_until(session, "participants", |s| {
        s.remote_participants.participant_map.len() == 2
    })
    .await?;

    session.dispatch(ChatAction::SendMessageRequested {
        content: "Hello from the simulator".to_string(),
    });
    wait_until(session, "chat message", |s| !s.chat.messages.is_empty()).await?;

    sdk.set_participants(roster(&["Ada"]));
    session.dispatch(CallingAction::CallEndRequested);
    wait_until(session, "exit", |s| s.navigation.status == NavigationStatus::Exit).await?;
    Ok(&["participants_joined", "exit"])
}

async fn bluetooth(session: &CompositeSession) -> Result<Expected> {
    join(session).await?;

    session.dispatch(LocalUserAction::AudioDeviceBluetoothScoAvailable {
        available: true,
        device_name: Some("Simulated Headset".to_string()),
    });
    wait_until(session, "bluetooth route", |s| {
        s.local_user.audio.device.is_bluetooth()
    })
    .await?;

    session.dispatch(LocalUserAction::AudioDeviceBluetoothScoAvailable {
        available: false,
        device_name: None,
    });
    wait_until(session, "previous route", |s| {
        !s.local_user.audio.device.is_bluetooth()
    })
    .await?;

    session.dispatch(CallingAction::CallEndRequested);
    wait_until(session, "exit", |s| s.navigation.status == NavigationStatus::Exit).await?;
    Ok(&["exit"])
}

async fn token_expired(session: &CompositeSession, sdk: &MockCallingSdk) -> Result<Expected> {
    join(session).await?;

    sdk.emit(SdkEvent::CallStateChanged {
        status: CallingStatus::Disconnected,
        error: Some(CallStateError::new(ErrorCode::TokenExpired)),
    });
    wait_until(session, "emergency exit", |s| {
        s.navigation.status == NavigationStatus::Exit
    })
    .await?;
    session.store().settle().await;
    Ok(&["error", "exit"])
}

async fn declined(session: &CompositeSession, sdk: &MockCallingSdk) -> Result<Expected> {
    join(session).await?;

    sdk.emit(SdkEvent::CallStateChanged {
        status: CallingStatus::Disconnected,
        error: Some(CallStateError::with_event(
            ErrorCode::CallDeclined,
            CallCompositeEventCode::CallDeclined,
        )),
    });
    wait_until(session, "disconnect", |s| {
        s.call.calling_status == CallingStatus::Disconnected
    })
    .await?;
    session.store().settle().await;
    Ok(&[])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["callkit-sim"]).unwrap();
        assert_eq!(cli.scenario, Scenario::Basic);
        assert_eq!(cli.format, OutputFormat::Text);
        assert_eq!(cli.latency_ms, 0);
    }

    #[test]
    fn test_cli_scenario_names() {
        let cli = Cli::try_parse_from(["callkit-sim", "--scenario", "token-expired"]).unwrap();
        assert_eq!(cli.scenario, Scenario::TokenExpired);
        assert!(Cli::try_parse_from(["callkit-sim", "--scenario", "hangup"]).is_err());
    }

    #[test]
    fn test_roster_ids() {
        let roster = roster(&["Ada"]);
        let ada = roster.get("8:acs:ada").unwrap();
        assert_eq!(ada.display_name, "Ada");
    }
}
