use thiserror::Error;

/// Errors from artifact store operations.
///
/// Absence is not an error in this layer: a missing version or a missing
/// artifact inside the newest version surfaces as an empty or partial result
/// map, never as an `Err`. Only unrecoverable I/O and exhausted retries
/// propagate.
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O error from the local filesystem backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure reported by the object-store client.
    #[error("backend error: {message}")]
    Backend {
        message: String,
        /// Transient failures (network, throttling) are eligible for retry;
        /// everything else is surfaced immediately.
        transient: bool,
    },

    /// A transient failure persisted through every retry attempt.
    #[error("retries exhausted after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: String },

    /// Client or environment configuration is unusable.
    #[error("configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// Build a transient backend error (retry-eligible).
    pub fn transient(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
            transient: true,
        }
    }

    /// Build a permanent backend error (never retried).
    pub fn permanent(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
            transient: false,
        }
    }

    /// Whether a retry may succeed where this attempt failed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Backend { transient: true, .. })
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(StoreError::transient("connection reset").is_transient());
        assert!(!StoreError::permanent("access denied").is_transient());
        assert!(!StoreError::Config("no bucket".into()).is_transient());
        let io = StoreError::Io(std::io::Error::other("disk"));
        assert!(!io.is_transient());
    }

    #[test]
    fn display_includes_message() {
        let err = StoreError::transient("throttled");
        assert_eq!(err.to_string(), "backend error: throttled");
        let err = StoreError::RetriesExhausted {
            attempts: 5,
            last: "timeout".into(),
        };
        assert!(err.to_string().contains("5 attempts"));
    }
}
