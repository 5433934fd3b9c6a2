#![forbid(unsafe_code)]

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ViewError>;

/// Errors raised at the string and JSON boundaries of the view.
///
/// The typed API (`View::render` with a [`Command`](crate::Command)) cannot
/// fail: display commands degrade to no-ops when their targets are missing.
#[derive(Debug, Error)]
pub enum ViewError {
    /// A JSON-encoded command was malformed or named an unknown command.
    #[cfg(feature = "serde")]
    #[error("invalid command: {0}")]
    InvalidCommand(#[source] serde_json::Error),

    #[error("unknown event name: {name}")]
    UnknownEvent { name: String },

    #[error("unknown filter page: {page}")]
    UnknownFilter { page: String },
}

impl ViewError {
    #[must_use]
    pub fn unknown_event(name: impl Into<String>) -> Self {
        Self::UnknownEvent { name: name.into() }
    }

    #[must_use]
    pub fn unknown_filter(page: impl Into<String>) -> Self {
        Self::UnknownFilter { page: page.into() }
    }
}
