//! Error types for data parsing in tlw64-types.

use thiserror::Error;

/// Errors that can occur when interpreting TLW64 protocol bytes.
///
/// This error type is platform-agnostic and does not include
/// BLE-specific errors (those belong in tlw64-core).
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// A payload was shorter than its fixed layout.
    #[error("Insufficient bytes: requires {expected} bytes, got {actual}")]
    InsufficientBytes {
        /// Number of bytes the layout needs.
        expected: usize,
        /// Number of bytes received.
        actual: usize,
    },

    /// The first byte of a buffer is not a known opcode.
    #[error("Unknown opcode: 0x{0:02X}")]
    UnknownOpcode(u8),
}

/// Result type alias using tlw64-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
