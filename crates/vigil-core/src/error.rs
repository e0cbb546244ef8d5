//! Error types for the value model.

use thiserror::Error;

/// Errors raised while reading or assigning properties of a [`Value`](crate::Value).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("property name {name:?} contains separator {separator:?}")]
    InvalidPropertyName { name: String, separator: String },

    #[error("{0:?} is not an index of a sequence")]
    NotAnIndex(String),

    #[error("invalid sequence length: {0}")]
    InvalidLength(String),

    #[error("property {0:?} is read-only")]
    ReadOnlyProperty(String),

    #[error("value of type {0} has no properties")]
    NotComposite(&'static str),
}

pub type Result<T> = std::result::Result<T, CoreError>;
