use thiserror::Error;

/// Errors surfaced by the simulation core and its persistence adapter.
///
/// Tick sub-steps never surface these to callers: `Creature::update` and
/// `Environment::update` log and skip a failing step instead.
#[derive(Debug, Error)]
pub enum SimError {
    /// Invalid constructor/setter input or a snapshot that fails field validation.
    #[error("validation error: {0}")]
    Validation(String),

    /// A save was requested before the minimum interval elapsed.
    #[error("save rate limited, retry in {retry_after_ms} ms")]
    RateLimited { retry_after_ms: u64 },

    /// Checksum mismatch or an unreadable snapshot.
    #[error("integrity error: {0}")]
    Integrity(String),

    /// Wrapper around IO errors (directory creation, reads, renames).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapper around JSON serialization errors.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Wallet does not hold enough bills for a purchase.
    #[error("insufficient funds")]
    InsufficientFunds,

    /// Unexpected fault inside a tick step or a background task.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<crate::validation::NameError> for SimError {
    fn from(err: crate::validation::NameError) -> Self {
        SimError::Validation(err.to_string())
    }
}
