//! Error types for the classifier bridge.
//!
//! Engine failures arrive as an [`EngineStatus`] and leave the bridge as a
//! [`BridgeError`]. The bridge only wraps the engine's message; it never
//! writes diagnostics of its own for engine failures.

use thiserror::Error;

/// Result type alias using [`BridgeError`].
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Canonical status codes reported by classification engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    InvalidArgument,
    NotFound,
    Internal,
}

/// Failure reported by an engine: a code plus a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct EngineStatus {
    pub code: StatusCode,
    pub message: String,
}

impl EngineStatus {
    pub fn new(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(StatusCode::InvalidArgument, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NotFound, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::Internal, message)
    }
}

/// Host-visible failure category.
///
/// Hosts map these onto their own exception types; the discriminants are the
/// `error_kind` values of the C ABI (0 means success).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum FailureKind {
    /// The engine rejected the request.
    AssertionError = 1,
    /// The host passed something unusable (bad handle, bad config).
    IllegalArgument = 2,
    /// The bridge cannot serve the request in its current state.
    IllegalState = 3,
}

/// Errors surfaced to the host by the bridge.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Engine rejected the options or model data; no handle was created.
    #[error("Error occurred when initializing classifier: {0}")]
    Initialization(EngineStatus),

    /// Engine rejected the frame or failed internally; no result was produced.
    #[error("Error occurred when classifying the image: {0}")]
    Classification(EngineStatus),

    /// Handle was never issued or has already been released.
    ///
    /// Reaching this is a caller bug: hosts must serialize
    /// initialize, classify and release per handle.
    #[error("invalid classifier handle: {0}")]
    InvalidHandle(u64),

    /// Malformed host input (null pointer, bad UTF-8, oversized buffer).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Options JSON could not be parsed
    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),

    /// No engine factory has been installed for the C ABI.
    #[error("no image classifier engine installed")]
    EngineUnavailable,
}

impl BridgeError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Initialization(_) | Self::Classification(_) => FailureKind::AssertionError,
            Self::InvalidHandle(_) | Self::InvalidArgument(_) | Self::Config(_) => {
                FailureKind::IllegalArgument
            }
            Self::EngineUnavailable => FailureKind::IllegalState,
        }
    }

    /// The engine status behind this error, if the engine produced it.
    pub fn engine_status(&self) -> Option<&EngineStatus> {
        match self {
            Self::Initialization(status) | Self::Classification(status) => Some(status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialization_message_wraps_engine_message() {
        let err = BridgeError::Initialization(EngineStatus::invalid_argument(
            "Unable to mmap model file",
        ));
        assert_eq!(
            err.to_string(),
            "Error occurred when initializing classifier: Unable to mmap model file"
        );
        assert_eq!(err.kind(), FailureKind::AssertionError);
    }

    #[test]
    fn test_classification_message_wraps_engine_message() {
        let err = BridgeError::Classification(EngineStatus::internal("tensor shape mismatch"));
        assert_eq!(
            err.to_string(),
            "Error occurred when classifying the image: tensor shape mismatch"
        );
        assert_eq!(err.kind(), FailureKind::AssertionError);
        assert_eq!(
            err.engine_status().map(|s| s.code),
            Some(StatusCode::Internal)
        );
    }

    #[test]
    fn test_contract_violations_are_illegal_argument() {
        assert_eq!(
            BridgeError::InvalidHandle(7).kind(),
            FailureKind::IllegalArgument
        );
        assert!(BridgeError::InvalidHandle(7).engine_status().is_none());
        assert_eq!(
            BridgeError::EngineUnavailable.kind(),
            FailureKind::IllegalState
        );
    }

    #[test]
    fn test_failure_kind_discriminants() {
        assert_eq!(FailureKind::AssertionError as i32, 1);
        assert_eq!(FailureKind::IllegalArgument as i32, 2);
        assert_eq!(FailureKind::IllegalState as i32, 3);
    }
}
