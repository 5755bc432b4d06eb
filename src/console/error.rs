//! Console error types

use crate::error::LinkError;

/// Console error with code and message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleError {
    /// E01: Unknown command or parameter
    UnknownCommand,
    /// E02: Invalid value format
    InvalidValue,
    /// E03: Wrong number of arguments
    Usage,
    /// E04: Value out of allowed range
    OutOfRange,
    /// E05: Text does not fit the send buffer
    TooLong { max: usize },
    /// E06: The link refused or failed the operation
    Link(LinkError),
}

impl ConsoleError {
    /// Get error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownCommand => "E01",
            Self::InvalidValue => "E02",
            Self::Usage => "E03",
            Self::OutOfRange => "E04",
            Self::TooLong { .. } => "E05",
            Self::Link(_) => "E06",
        }
    }

    /// Get error message
    pub fn message(&self) -> &'static str {
        match self {
            Self::UnknownCommand => "unknown command",
            Self::InvalidValue => "invalid value",
            Self::Usage => "wrong number of arguments",
            Self::OutOfRange => "out of range",
            Self::TooLong { .. } => "input too long",
            Self::Link(_) => "failed to send",
        }
    }
}

impl From<LinkError> for ConsoleError {
    fn from(e: LinkError) -> Self {
        match e {
            LinkError::TooLong { max } => Self::TooLong { max },
            other => Self::Link(other),
        }
    }
}

impl core::fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::TooLong { max } => write!(f, "{}: {} (max {} chars)", self.code(), self.message(), max),
            Self::Link(e) => write!(f, "{}: {} (error: {})", self.code(), self.message(), e.code()),
            _ => write!(f, "{}: {}", self.code(), self.message()),
        }
    }
}
