use crate::actor::ActorError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// # Grain Error
///
/// Errors surfaced to code that activates or calls grains.
///
/// Call failures are always handed back to the caller as-is. Nothing in this
/// crate retries a failed call; whether and how to retry is the caller's choice.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrainError {
    /// An activation was requested for a kind that was never registered
    #[error("Unknown kind: {0}")]
    UnknownKind(String),

    /// The remote side did not answer within the call timeout
    #[error("Request timed out after {timeout_ms}ms")]
    RequestTimeout { timeout_ms: u64 },

    /// The request could not be delivered or its reply channel was dropped
    #[error("Transport failure: {0}")]
    TransportFailure(String),

    /// Request or response payload could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The target grain does not route the given method index
    #[error("Unknown method index: {0}")]
    UnknownMethod(u32),

    /// The grain handler itself reported a failure
    #[error("Grain failed: {0}")]
    Remote(String),

    /// The activation could not be spawned
    #[error("Activation failed: {0}")]
    ActivationFailed(String),
}

impl GrainError {
    /// Builds a timeout error for the given call timeout.
    pub fn timeout(timeout: Duration) -> Self {
        Self::RequestTimeout {
            timeout_ms: timeout.as_millis() as u64,
        }
    }

    /// True for the failures a caller sees as "the request failed": timeouts
    /// and transport failures.
    pub fn is_request_failure(&self) -> bool {
        matches!(
            self,
            Self::RequestTimeout { .. } | Self::TransportFailure(_)
        )
    }
}

impl From<ActorError> for GrainError {
    fn from(error: ActorError) -> Self {
        match error {
            ActorError::Stopping => Self::ActivationFailed(error.to_string()),
            other => Self::TransportFailure(other.to_string()),
        }
    }
}

/// Errors raised while loading a cluster configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}
