use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("malformed version name: {0:?}")]
    MalformedVersion(String),

    #[error("unknown artifact format: {0:?}")]
    UnknownFormat(String),

    #[error("unknown artifact kind: {0:?}")]
    UnknownKind(String),
}
