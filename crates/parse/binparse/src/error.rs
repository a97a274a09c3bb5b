//! Overlay error type.

use core::fmt;

/// Errors raised when overlaying records on a byte buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayError {
    /// The requested span does not fit inside the buffer.
    OutOfBounds {
        /// Start of the requested span.
        offset: usize,
        /// Length of the requested span.
        len: usize,
        /// Number of bytes in the buffer.
        available: usize,
    },
    /// Replacement bytes do not match the size of the record.
    LengthMismatch {
        /// Size of the record in bytes.
        expected: usize,
        /// Number of bytes supplied.
        actual: usize,
    },
    /// A table stride is smaller than the record it steps over.
    InvalidStride {
        /// Declared distance between consecutive records.
        stride: usize,
        /// Size of one record.
        size: usize,
    },
}

impl fmt::Display for OverlayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds {
                offset,
                len,
                available,
            } => write!(
                f,
                "span {offset:#x}..+{len:#x} exceeds buffer of {available:#x} bytes"
            ),
            Self::LengthMismatch { expected, actual } => {
                write!(f, "expected {expected} bytes, got {actual}")
            }
            Self::InvalidStride { stride, size } => {
                write!(f, "stride {stride} is smaller than record size {size}")
            }
        }
    }
}

impl core::error::Error for OverlayError {}

/// Returns the `offset..offset + len` span of `data`, or an
/// [`OverlayError::OutOfBounds`] describing the shortfall.
pub(crate) fn span(data: &[u8], offset: usize, len: usize) -> Result<&[u8], OverlayError> {
    offset
        .checked_add(len)
        .and_then(|end| data.get(offset..end))
        .ok_or(OverlayError::OutOfBounds {
            offset,
            len,
            available: data.len(),
        })
}
