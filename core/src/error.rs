//! Errors raised by the path API.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    /// The key is not among the path's property names for its configuration.
    #[error("unknown property {name:?} on path {path:?}")]
    UnknownProperty { name: String, path: String },
    #[error("invalid match pattern {pattern:?}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}
