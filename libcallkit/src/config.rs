//! Configuration management for Callkit
//!
//! Two layers: [`Config`] is the optional TOML file holding non-secret
//! defaults, and [`CallConfiguration`] is the immutable per-session setup
//! (credential, call target, initial device intent) handed to the store.

use std::path::{Path, PathBuf};

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ConfigError, Result};
use crate::redux::state::{AudioDevice, AudioDeviceSelectionStatus};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub call: CallDefaultsConfig,
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub participants: ParticipantsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Number of published states buffered per subscriber before a slow
    /// subscriber starts skipping to newer states
    #[serde(default = "default_state_buffer")]
    pub state_buffer: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallDefaultsConfig {
    #[serde(default)]
    pub camera_on_by_default: bool,
    #[serde(default = "default_true")]
    pub mic_on_by_default: bool,
    #[serde(default)]
    pub skip_setup_screen: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioConfig {
    #[serde(default)]
    pub default_device: DefaultAudioDevice,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultAudioDevice {
    #[default]
    Speaker,
    Receiver,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParticipantsConfig {
    #[serde(default)]
    pub join_notification: JoinNotification,
}

/// How participant-joined events reach the host application.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinNotification {
    /// One event per roster change listing every joined participant
    #[default]
    Batched,
    /// One event per joined participant
    PerParticipant,
}

fn default_state_buffer() -> usize {
    64
}

fn default_true() -> bool {
    true
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            state_buffer: default_state_buffer(),
        }
    }
}

impl Default for CallDefaultsConfig {
    fn default() -> Self {
        Self {
            camera_on_by_default: false,
            mic_on_by_default: default_true(),
            skip_setup_screen: false,
        }
    }
}

impl Config {
    /// Load configuration from the default location
    ///
    /// A missing file yields the default configuration.
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path()?;
        if !config_path.exists() {
            tracing::debug!("No config file at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.store.state_buffer == 0 {
            return Err(ConfigError::InvalidValue {
                field: "store.state_buffer".to_string(),
                value: "0".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

/// Resolve the configuration file path using the XDG config directory
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("CALLKIT_CONFIG") {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("callkit").join("config.toml"))
}

/// What the session joins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallTarget {
    GroupCall(Uuid),
    TeamsMeeting(String),
    Room(String),
}

/// Immutable per-session setup, read-only after launch.
#[derive(Debug)]
pub struct CallConfiguration {
    pub access_token: SecretString,
    pub target: CallTarget,
    pub display_name: Option<String>,
    pub camera_on_by_default: bool,
    pub mic_on_by_default: bool,
    pub skip_setup_screen: bool,
    pub default_audio_device: AudioDeviceSelectionStatus,
    pub join_notification: JoinNotification,
    pub state_buffer: usize,
}

impl CallConfiguration {
    pub fn builder(access_token: impl Into<String>) -> CallConfigurationBuilder {
        CallConfigurationBuilder::new(access_token.into())
    }

    /// Build a session configuration from file defaults.
    pub fn from_config(
        config: &Config,
        access_token: impl Into<String>,
        target: CallTarget,
    ) -> CallConfigurationBuilder {
        let device = match config.audio.default_device {
            DefaultAudioDevice::Speaker => AudioDevice::Speaker,
            DefaultAudioDevice::Receiver => AudioDevice::Receiver,
        };
        Self::builder(access_token)
            .target(target)
            .camera_on_by_default(config.call.camera_on_by_default)
            .mic_on_by_default(config.call.mic_on_by_default)
            .skip_setup_screen(config.call.skip_setup_screen)
            .default_audio_device(AudioDeviceSelectionStatus::selected_for(device))
            .join_notification(config.participants.join_notification)
            .state_buffer(config.store.state_buffer)
    }
}

pub struct CallConfigurationBuilder {
    config: CallConfiguration,
}

impl CallConfigurationBuilder {
    fn new(access_token: String) -> Self {
        Self {
            config: CallConfiguration {
                access_token: SecretString::from(access_token),
                target: CallTarget::GroupCall(Uuid::new_v4()),
                display_name: None,
                camera_on_by_default: false,
                mic_on_by_default: true,
                skip_setup_screen: false,
                default_audio_device: AudioDeviceSelectionStatus::SpeakerSelected,
                join_notification: JoinNotification::Batched,
                state_buffer: default_state_buffer(),
            },
        }
    }

    pub fn target(mut self, target: CallTarget) -> Self {
        self.config.target = target;
        self
    }

    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.config.display_name = Some(name.into());
        self
    }

    pub fn camera_on_by_default(mut self, on: bool) -> Self {
        self.config.camera_on_by_default = on;
        self
    }

    pub fn mic_on_by_default(mut self, on: bool) -> Self {
        self.config.mic_on_by_default = on;
        self
    }

    pub fn skip_setup_screen(mut self, skip: bool) -> Self {
        self.config.skip_setup_screen = skip;
        self
    }

    pub fn default_audio_device(mut self, device: AudioDeviceSelectionStatus) -> Self {
        self.config.default_audio_device = device.selected();
        self
    }

    pub fn join_notification(mut self, mode: JoinNotification) -> Self {
        self.config.join_notification = mode;
        self
    }

    pub fn state_buffer(mut self, capacity: usize) -> Self {
        self.config.state_buffer = capacity.max(1);
        self
    }

    pub fn build(self) -> CallConfiguration {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_from_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[store]
state_buffer = 16

[call]
camera_on_by_default = true
skip_setup_screen = true

[audio]
default_device = "receiver"

[participants]
join_notification = "per_participant"
"#
        )
        .unwrap();

        let config = Config::load_from_path(file.path()).unwrap();
        assert_eq!(config.store.state_buffer, 16);
        assert!(config.call.camera_on_by_default);
        assert!(config.call.mic_on_by_default);
        assert!(config.call.skip_setup_screen);
        assert_eq!(config.audio.default_device, DefaultAudioDevice::Receiver);
        assert_eq!(
            config.participants.join_notification,
            JoinNotification::PerParticipant
        );
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let file = NamedTempFile::new().unwrap();
        let config = Config::load_from_path(file.path()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.store.state_buffer, 64);
    }

    #[test]
    fn test_invalid_device_is_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[audio]\ndefault_device = \"headset\"").unwrap();

        let err = Config::load_from_path(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }

    #[test]
    fn test_zero_buffer_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[store]\nstate_buffer = 0").unwrap();

        let err = Config::load_from_path(file.path()).unwrap_err();
        assert!(err.to_string().contains("store.state_buffer"));
    }

    #[test]
    #[serial]
    fn test_config_path_from_env() {
        std::env::set_var("CALLKIT_CONFIG", "/tmp/callkit-test/config.toml");
        let path = resolve_config_path().unwrap();
        std::env::remove_var("CALLKIT_CONFIG");
        assert_eq!(path, PathBuf::from("/tmp/callkit-test/config.toml"));
    }

    #[test]
    #[serial]
    fn test_missing_file_yields_defaults() {
        std::env::set_var("CALLKIT_CONFIG", "/nonexistent/callkit/config.toml");
        let config = Config::load().unwrap();
        std::env::remove_var("CALLKIT_CONFIG");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_call_configuration_from_config() {
        let mut config = Config::default();
        config.audio.default_device = DefaultAudioDevice::Receiver;
        config.call.skip_setup_screen = true;

        let call = CallConfiguration::from_config(
            &config,
            "secret-token",
            CallTarget::Room("room-1".to_string()),
        )
        .display_name("Grace")
        .build();

        assert_eq!(call.target, CallTarget::Room("room-1".to_string()));
        assert_eq!(call.default_audio_device, AudioDeviceSelectionStatus::ReceiverSelected);
        assert!(call.skip_setup_screen);
        assert_eq!(call.access_token.expose_secret(), "secret-token");
    }

    #[test]
    fn test_token_not_in_debug_output() {
        let call = CallConfiguration::builder("super-secret").build();
        assert!(!format!("{:?}", call).contains("super-secret"));
    }
}
