//! Crate error type.
//!
//! Rule failures are *not* errors: they are returned as [`Verdict`](crate::validation::Verdict)
//! values and silent skips in the assembler. This type only covers faults at
//! the crate edges: malformed literals, unreadable configuration, refused
//! commits, and advisory-service failures.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised at the edges of the scheduling engine.
#[derive(Debug, Error)]
pub enum Error {
    /// A clock time literal could not be parsed (expected `HH:MM`).
    #[error("invalid time '{value}': expected HH:MM")]
    InvalidTime { value: String },

    /// A day-of-week literal could not be parsed.
    #[error("invalid day of week '{value}'")]
    InvalidDay { value: String },

    /// A class duration outside the supported set (0.5, 0.75, 1.0 hours).
    #[error("unsupported class duration {hours}h (expected 0.5, 0.75 or 1.0)")]
    InvalidDuration { hours: f64 },

    /// Policy configuration could not be parsed.
    #[error("invalid policy configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// A candidate was refused when committing it to a schedule.
    #[error("class rejected: {reason}")]
    Rejected {
        reason: String,
        /// Whether an explicit override would have admitted the class.
        overridable: bool,
    },

    /// The external advisory service failed or returned unusable output.
    #[error("advisory service '{provider}' failed: {reason}")]
    Advisor { provider: String, reason: String },
}

impl Error {
    /// Creates an advisory-service error.
    pub fn advisor(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Advisor {
            provider: provider.into(),
            reason: reason.into(),
        }
    }

    /// Whether a human override could resolve this error.
    pub fn is_overridable(&self) -> bool {
        matches!(
            self,
            Self::Rejected {
                overridable: true,
                ..
            }
        )
    }
}
