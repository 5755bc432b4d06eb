//! Link error types

use crate::buffer::CapacityError;

/// Why a send failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// Transport not initialized or unavailable.
    NotReady,
    /// Hardware never confirmed transmit completion.
    Timeout,
    /// Payload does not fit the send buffer.
    TooLong { max: usize },
}

impl LinkError {
    /// Numeric code shown to the operator (negative errno).
    pub fn code(&self) -> i32 {
        match self {
            Self::NotReady => -19,
            Self::Timeout => -11,
            Self::TooLong { .. } => -22,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::NotReady => "device not ready",
            Self::Timeout => "transmit timeout",
            Self::TooLong { .. } => "input too long",
        }
    }
}

impl core::fmt::Display for LinkError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::TooLong { max } => write!(f, "{} (max {} chars)", self.message(), max),
            _ => write!(f, "{} ({})", self.message(), self.code()),
        }
    }
}

impl From<CapacityError> for LinkError {
    fn from(e: CapacityError) -> Self {
        LinkError::TooLong { max: e.max }
    }
}
