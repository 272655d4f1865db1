//! # Error Types
//!
//! Errors raised when decoding shared enumerations from text.

use thiserror::Error;

/// A wire string did not name a member of the expected enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Unknown key type spelling.
    #[error("unknown key type: {0}")]
    UnknownKeyType(String),

    /// Unknown account type spelling.
    #[error("unknown account type: {0}")]
    UnknownAccountType(String),

    /// Unknown registry account type code.
    #[error("unknown registry account type: {0}")]
    UnknownRegistryAccountType(String),
}
