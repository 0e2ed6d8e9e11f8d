use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, Serialize, Clone, PartialEq)]
#[serde(tag = "type", content = "message")]
pub enum PlayerError {
    #[error("Index {index} out of range for queue of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("No track is currently loaded")]
    NoCurrentTrack,

    #[error("Provider '{provider}' failed: {message}")]
    Provider { provider: String, message: String },

    #[error("Audio device error: {0}")]
    Device(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, PlayerError>;

impl PlayerError {
    /// Caller misuse that callers may safely treat as a no-op.
    pub fn is_benign(&self) -> bool {
        matches!(self, PlayerError::NoCurrentTrack)
    }
}

// Implement From traits for common error types to simplify conversion

impl From<std::io::Error> for PlayerError {
    fn from(e: std::io::Error) -> Self {
        PlayerError::Config(e.to_string())
    }
}

impl From<serde_json::Error> for PlayerError {
    fn from(e: serde_json::Error) -> Self {
        PlayerError::Config(format!("Serialization error: {}", e))
    }
}

impl From<String> for PlayerError {
    fn from(e: String) -> Self {
        PlayerError::Internal(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serializes_with_type_tag() {
        let err = PlayerError::Device("device lost".to_string());
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["type"], "Device");
        assert_eq!(json["message"], "device lost");
    }

    #[test]
    fn test_index_error_message() {
        let err = PlayerError::IndexOutOfRange { index: 7, len: 3 };
        assert_eq!(err.to_string(), "Index 7 out of range for queue of length 3");
        assert!(!err.is_benign());
        assert!(PlayerError::NoCurrentTrack.is_benign());
    }
}
