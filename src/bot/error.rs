//! Error types for the conversation core.
//!
//! Not-found and validation conditions are handled inside the handlers and
//! never reach these types; what remains is infrastructure failure, logged
//! once with a stable code and turned into one generic user-facing reply.

use thiserror::Error;

use crate::storage::StorageError;

/// Infrastructure failure during event processing.
#[derive(Debug, Error)]
pub enum BotError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Argon2 hashing failed. Fatal to the request, never silently ignored.
    #[error("password hashing failed: {0}")]
    Hash(#[from] password_hash::Error),
}

/// Stable codes attached to logged infrastructure errors and echoed in the
/// generic user-facing reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Session = 10,
    GetUser = 11,
    AddUser = 12,
    UpdateUsername = 13,
    GetList = 21,
    AddWish = 22,
    DeleteWish = 23,
    ChangePassword = 31,
}

impl ErrorCode {
    pub fn code(self) -> u16 {
        self as u16
    }
}
