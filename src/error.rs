use thiserror::Error;

/// Errors returned by the todo store and the creation boundary.
#[derive(Error, Debug)]
pub enum Error {
    /// No todo is stored under the requested id.
    #[error("todo not found: {0}")]
    NotFound(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage lock poisoned")]
    LockPoisoned,

    /// Rejected user input (empty or oversized fields, ambiguous ids).
    #[error("{0}")]
    Validation(String),

    #[error("invalid deadline '{input}': {reason}")]
    InvalidDeadline { input: String, reason: String },
}

impl Error {
    /// True for failures of the underlying store: I/O, serialization or locking.
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            Error::Database(_) | Error::Serialization(_) | Error::Io(_) | Error::LockPoisoned
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// True for input rejected before it reaches storage.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_) | Error::InvalidDeadline { .. })
    }
}

impl<T> From<std::sync::PoisonError<T>> for Error {
    fn from(_: std::sync::PoisonError<T>) -> Error {
        Error::LockPoisoned
    }
}

pub type Result<T> = std::result::Result<T, Error>;
