//! Error types for Callkit

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CallkitError>;

#[derive(Error, Debug)]
pub enum CallkitError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("SDK error: {0}")]
    Sdk(#[from] SdkError),

    #[error("Audio routing error: {0}")]
    AudioRouting(#[from] AudioRoutingError),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl CallkitError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CallkitError::InvalidInput(_) => 3,
            CallkitError::Sdk(SdkError::Authentication(_)) => 2,
            CallkitError::Sdk(_) => 1,
            CallkitError::AudioRouting(_) => 1,
            CallkitError::Config(_) => 1,
            CallkitError::Session(_) => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },
}

/// Errors reported by the calling/chat SDK adapter.
///
/// These are carried inside application state (camera, mic and error
/// slices), so they are cloneable and compared by value.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum SdkError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Call start failed: {0}")]
    CallStart(String),

    #[error("Call end failed: {0}")]
    CallEnd(String),

    #[error("Camera operation failed: {0}")]
    Camera(String),

    #[error("Microphone operation failed: {0}")]
    Microphone(String),

    #[error("Hold operation failed: {0}")]
    Hold(String),

    #[error("Captions operation failed: {0}")]
    Captions(String),

    #[error("Chat operation failed: {0}")]
    Chat(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("SDK has been disposed")]
    Disposed,
}

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum AudioRoutingError {
    #[error("Audio device unavailable: {0}")]
    Unavailable(String),

    #[error("Audio route rejected: {0}")]
    Rejected(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_invalid_input() {
        let error = CallkitError::InvalidInput("Unknown scenario".to_string());
        assert_eq!(error.exit_code(), 3);
    }

    #[test]
    fn test_exit_code_authentication_error() {
        let error = CallkitError::Sdk(SdkError::Authentication("Token rejected".to_string()));
        assert_eq!(error.exit_code(), 2);
    }

    #[test]
    fn test_exit_code_call_start_error() {
        let error = CallkitError::Sdk(SdkError::CallStart("No route".to_string()));
        assert_eq!(error.exit_code(), 1);
    }

    #[test]
    fn test_exit_code_config_error() {
        let error = CallkitError::Config(ConfigError::MissingField("call.target".to_string()));
        assert_eq!(error.exit_code(), 1);
    }

    #[test]
    fn test_error_message_formatting_sdk() {
        let error = CallkitError::Sdk(SdkError::Camera("Camera busy".to_string()));
        assert_eq!(
            error.to_string(),
            "SDK error: Camera operation failed: Camera busy"
        );
    }

    #[test]
    fn test_error_message_formatting_invalid_value() {
        let error = ConfigError::InvalidValue {
            field: "audio.default_device".to_string(),
            value: "headset".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid value for audio.default_device: headset"
        );
    }

    #[test]
    fn test_error_conversion_from_audio_routing_error() {
        let routing_error = AudioRoutingError::Unavailable("bluetooth".to_string());
        let callkit_error: CallkitError = routing_error.into();

        match callkit_error {
            CallkitError::AudioRouting(_) => {}
            _ => panic!("Expected CallkitError::AudioRouting"),
        }
    }

    #[test]
    fn test_sdk_errors_compare_by_value() {
        let a = SdkError::Microphone("muted by policy".to_string());
        let b = SdkError::Microphone("muted by policy".to_string());
        let c = SdkError::Microphone("device lost".to_string());
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
