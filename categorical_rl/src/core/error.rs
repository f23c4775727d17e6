//! Error taxonomy for the C51 core.

use std::fmt;

/// Errors raised by the support, projector, replay store and sampler.
#[derive(Debug, Clone, PartialEq)]
pub enum C51Error {
    /// Bad construction parameters. Fatal: no valid object can exist.
    InvalidConfiguration {
        field: &'static str,
        reason: String,
    },
    /// Sampling was requested before any transition was stored.
    ///
    /// Recoverable: skip the training step and keep collecting experience.
    InsufficientHistory {
        write_count: u64,
    },
    /// An input had the wrong length or batch size for this call.
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },
    /// Tensor data could not be read back from the backend.
    Tensor(String),
}

impl C51Error {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        C51Error::InvalidConfiguration {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn shape(what: &'static str, expected: usize, got: usize) -> Self {
        C51Error::ShapeMismatch { what, expected, got }
    }

    /// Whether the caller can continue after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, C51Error::InsufficientHistory { .. })
    }
}

impl fmt::Display for C51Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            C51Error::InvalidConfiguration { field, reason } => {
                write!(f, "invalid configuration for {}: {}", field, reason)
            }
            C51Error::InsufficientHistory { write_count } => {
                write!(
                    f,
                    "insufficient history: {} inserts, nothing to sample",
                    write_count
                )
            }
            C51Error::ShapeMismatch { what, expected, got } => {
                write!(f, "shape mismatch for {}: expected {}, got {}", what, expected, got)
            }
            C51Error::Tensor(e) => write!(f, "tensor error: {}", e),
        }
    }
}

impl std::error::Error for C51Error {}
