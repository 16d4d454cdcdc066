//! Error types for binary stream and record operations

use std::io;
use std::path::PathBuf;

/// Result alias used throughout the engine
pub type Result<T> = std::result::Result<T, BinaryError>;

/// Errors that can occur while reading, writing, loading or saving records
#[derive(Debug, thiserror::Error)]
pub enum BinaryError {
    /// Fewer bytes remain than the requested primitive needs
    #[error(
        "Unexpected end of stream at offset {offset}: needed {needed} bytes, {available} available"
    )]
    TruncatedStream {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// A 7-bit encoded integer kept its continuation bit past the 5th byte
    #[error("Invalid 7-bit encoded integer at offset {offset}")]
    InvalidVarint { offset: usize },

    /// String length prefix width other than 1, 2, 4 or 8
    #[error("Invalid string length prefix width: {0} (expected 1, 2, 4 or 8)")]
    InvalidLengthPrefix(u8),

    /// An equality-constrained field did not hold its expected constant
    #[error("Invalid {field} value: {value}")]
    SchemaViolation { field: String, value: String },

    /// Attribute access named a field that is not part of the schema
    #[error("Record '{record}' has no field named '{field}'")]
    UnknownField { record: String, field: String },

    /// File could not be opened, read or written
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// An entry did not start with its required header bytes
    #[error("Entry {index} is missing its \"{}\" header", String::from_utf8_lossy(.expected))]
    InvalidMagic { index: usize, expected: [u8; 4] },

    /// String contained a non-ASCII byte
    #[error("Non-ASCII byte 0x{byte:02X} in string at offset {offset}")]
    InvalidString { offset: usize, byte: u8 },

    /// String is too long for its length prefix
    #[error("String of {len} bytes does not fit a {width}-byte length prefix")]
    StringTooLong { len: usize, width: u8 },

    /// Relative seek would move the cursor before the start of the buffer
    #[error("Cannot seek by {delta} from offset {offset}")]
    SeekOutOfBounds { offset: usize, delta: i64 },

    /// Value shape does not match the field's declared type
    #[error("Field '{field}' expects {expected}, got {found}")]
    TypeMismatch {
        field: String,
        expected: String,
        found: &'static str,
    },

    /// Fixed-count field was given the wrong number of elements
    #[error("Field '{field}' holds exactly {expected} elements, got {found}")]
    FixedCountMismatch {
        field: String,
        expected: usize,
        found: usize,
    },

    /// Element count does not fit the field's count type
    #[error("Field '{field}' has {len} elements, too many for its {count_type} count")]
    CountOutOfRange {
        field: String,
        len: usize,
        count_type: &'static str,
    },

    /// Nested records went deeper than the configured limit
    #[error("Record nesting exceeds the maximum depth of {max_depth} in '{record}'")]
    RecursionLimit { record: String, max_depth: usize },

    /// Schema definition is inconsistent
    #[error("Invalid schema '{schema}': {reason}")]
    InvalidSchema { schema: String, reason: String },
}

/// Coarse classification of errors for user-facing reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// File missing or not writable; callers can offer "create new" or "retry"
    NotFound,
    /// Data is not a file of the expected format or version, or is corrupt
    Unsupported,
    /// Misuse of the API or a broken schema definition
    Programming,
}

impl BinaryError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn schema(schema: &str, reason: impl Into<String>) -> Self {
        Self::InvalidSchema {
            schema: schema.to_string(),
            reason: reason.into(),
        }
    }

    /// Classify this error for reporting
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Io { .. } => ErrorCategory::NotFound,
            Self::TruncatedStream { .. }
            | Self::InvalidVarint { .. }
            | Self::SchemaViolation { .. }
            | Self::InvalidMagic { .. }
            | Self::InvalidString { .. }
            | Self::SeekOutOfBounds { .. }
            | Self::RecursionLimit { .. } => ErrorCategory::Unsupported,
            Self::InvalidLengthPrefix(_)
            | Self::UnknownField { .. }
            | Self::StringTooLong { .. }
            | Self::TypeMismatch { .. }
            | Self::FixedCountMismatch { .. }
            | Self::CountOutOfRange { .. }
            | Self::InvalidSchema { .. } => ErrorCategory::Programming,
        }
    }
}
