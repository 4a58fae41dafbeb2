#![forbid(unsafe_code)]

//! Error taxonomy for bridge handlers.
//!
//! None of these are fatal once the bridge is running: handler errors are
//! contained by [`crate::guard::contain`] and logged. Only host wiring at
//! boot (missing element, storage, or port) is allowed to fail loudly.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T, E = BridgeError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum BridgeError {
    /// Reading or writing persisted state failed.
    #[error("storage {op} failed: {message}")]
    Storage { op: &'static str, message: String },

    /// A message port is missing or its call threw.
    #[error("port `{port}` failed: {message}")]
    Port { port: &'static str, message: String },

    /// Shared bridge state was already borrowed when a callback fired.
    #[error("re-entrant dispatch in {0} handler")]
    Reentrant(&'static str),

    /// Host options did not match the expected schema.
    #[error("invalid bridge options: {0}")]
    Config(#[from] serde_json::Error),

    /// The designated composition element is not in the document.
    #[error("element #{0} not found")]
    MissingElement(String),
}

impl BridgeError {
    pub fn storage(op: &'static str, message: impl Into<String>) -> Self {
        Self::Storage {
            op,
            message: message.into(),
        }
    }

    pub fn port(port: &'static str, message: impl Into<String>) -> Self {
        Self::Port {
            port,
            message: message.into(),
        }
    }
}
