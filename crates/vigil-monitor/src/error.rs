//! Error types for monitors and tracking contexts.

use thiserror::Error;
use vigil_core::CoreError;

/// Errors that can occur while observing a value.
///
/// A failed operation leaves both the observed value and the tracking
/// context exactly as they were before the call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MonitorError {
    /// Only composite values can be monitored.
    #[error("cannot monitor value of type {0}")]
    InvalidArgument(&'static str),

    #[error("monitoring properties with {separator:?} in name rejected: {name:?}")]
    InvalidPropertyName { name: String, separator: String },

    /// The tracking context is exposed through `Monitor::context` only.
    #[error("property {0:?} is reserved for the tracking context")]
    ReservedProperty(String),

    #[error("replacing previously changed property {label} without prior saving")]
    RepeatedChange { label: String },

    #[error("property {0:?} is read-only")]
    ReadOnlyProperty(String),

    #[error("{0:?} is not an index of a sequence")]
    NotAnIndex(String),

    #[error("invalid sequence length: {0}")]
    InvalidLength(String),

    #[error("monitored value is a {0}, not a sequence")]
    NotASequence(&'static str),

    #[error("path not found: {0}")]
    PathNotFound(String),
}

impl From<CoreError> for MonitorError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidPropertyName { name, separator } => {
                MonitorError::InvalidPropertyName { name, separator }
            }
            CoreError::NotAnIndex(name) => MonitorError::NotAnIndex(name),
            CoreError::InvalidLength(value) => MonitorError::InvalidLength(value),
            CoreError::ReadOnlyProperty(name) => MonitorError::ReadOnlyProperty(name),
            CoreError::NotComposite(kind) => MonitorError::InvalidArgument(kind),
        }
    }
}

pub type Result<T> = std::result::Result<T, MonitorError>;
