//! Wire error types
//!
//! Every encode/decode failure surfaces as a single [`WireError`] that names
//! the message command and, where applicable, the field being processed.

use std::io;
use thiserror::Error;

/// Result type for wire operations
pub type WireResult<T> = Result<T, WireError>;

/// Errors produced while encoding or decoding wire messages
#[derive(Error, Debug)]
pub enum WireError {
    #[error("{command} message invalid for protocol version {pver} (requires {required})")]
    VersionTooLow {
        command: &'static str,
        pver: u32,
        required: u32,
    },

    #[error("{command}: unsupported {field} {value} for protocol version {pver}")]
    InvalidDiscriminant {
        command: &'static str,
        field: &'static str,
        value: u8,
        pver: u32,
    },

    #[error("{command}: address of type {kind} has {len} bytes, expected {expected}")]
    InvalidAddressLength {
        command: &'static str,
        kind: u8,
        len: usize,
        expected: usize,
    },

    #[error("{command}: address count {count} out of range [min {min}, max {max}]")]
    CountOutOfRange {
        command: &'static str,
        count: u64,
        min: u64,
        max: u64,
    },

    #[error("{command}: unexpected end of input reading {field}")]
    TruncatedInput {
        command: &'static str,
        field: &'static str,
    },

    #[error("{command}: short write of {field}")]
    ShortWrite {
        command: &'static str,
        field: &'static str,
    },

    #[error("{command}: {field} length {len} exceeds maximum {max}")]
    ElementTooLarge {
        command: &'static str,
        field: &'static str,
        len: u64,
        max: u64,
    },

    #[error("{command}: {field} is not valid UTF-8")]
    InvalidString {
        command: &'static str,
        field: &'static str,
    },

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("{command}: I/O error on {field}: {source}")]
    Io {
        command: &'static str,
        field: &'static str,
        #[source]
        source: io::Error,
    },
}

/// Flat classification of [`WireError`] variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    VersionTooLow,
    InvalidDiscriminant,
    InvalidAddressLength,
    CountOutOfRange,
    TruncatedInput,
    ShortWrite,
    ElementTooLarge,
    InvalidString,
    UnknownCommand,
    Io,
}

impl WireError {
    /// Map a reader failure to its wire error
    pub(crate) fn from_read(command: &'static str, field: &'static str, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => WireError::TruncatedInput { command, field },
            _ => WireError::Io {
                command,
                field,
                source: err,
            },
        }
    }

    /// Map a writer failure to its wire error
    pub(crate) fn from_write(command: &'static str, field: &'static str, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::WriteZero => WireError::ShortWrite { command, field },
            _ => WireError::Io {
                command,
                field,
                source: err,
            },
        }
    }

    /// Get the kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            WireError::VersionTooLow { .. } => ErrorKind::VersionTooLow,
            WireError::InvalidDiscriminant { .. } => ErrorKind::InvalidDiscriminant,
            WireError::InvalidAddressLength { .. } => ErrorKind::InvalidAddressLength,
            WireError::CountOutOfRange { .. } => ErrorKind::CountOutOfRange,
            WireError::TruncatedInput { .. } => ErrorKind::TruncatedInput,
            WireError::ShortWrite { .. } => ErrorKind::ShortWrite,
            WireError::ElementTooLarge { .. } => ErrorKind::ElementTooLarge,
            WireError::InvalidString { .. } => ErrorKind::InvalidString,
            WireError::UnknownCommand(_) => ErrorKind::UnknownCommand,
            WireError::Io { .. } => ErrorKind::Io,
        }
    }

    /// Command of the message that failed, when known
    pub fn command(&self) -> Option<&'static str> {
        match self {
            WireError::VersionTooLow { command, .. }
            | WireError::InvalidDiscriminant { command, .. }
            | WireError::InvalidAddressLength { command, .. }
            | WireError::CountOutOfRange { command, .. }
            | WireError::TruncatedInput { command, .. }
            | WireError::ShortWrite { command, .. }
            | WireError::ElementTooLarge { command, .. }
            | WireError::InvalidString { command, .. }
            | WireError::Io { command, .. } => Some(*command),
            WireError::UnknownCommand(_) => None,
        }
    }
}
