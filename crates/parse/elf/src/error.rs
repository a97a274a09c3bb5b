//! Decoder error types.

use core::fmt;
use std::io;

use kestrel_binparse::OverlayError;

/// Reasons the 16-byte identification block was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentError {
    /// The first four bytes are not `\x7fELF`.
    BadMagic([u8; 4]),
    /// `EI_CLASS` is neither `ELFCLASS32` nor `ELFCLASS64`.
    UnknownClass(u8),
    /// `EI_DATA` is neither `ELFDATA2LSB` nor `ELFDATA2MSB`.
    UnknownEncoding(u8),
}

impl fmt::Display for IdentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadMagic(magic) => write!(f, "invalid ELF magic bytes {magic:02x?}"),
            Self::UnknownClass(class) => write!(f, "unknown ELF class {class}"),
            Self::UnknownEncoding(data) => write!(f, "unknown data encoding {data}"),
        }
    }
}

/// Coarse classification of an [`ElfError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`ElfError::MalformedIdentification`].
    MalformedIdentification,
    /// See [`ElfError::TruncatedInput`].
    TruncatedInput,
    /// See [`ElfError::UnsupportedLayout`].
    UnsupportedLayout,
    /// See [`ElfError::UnresolvedReference`].
    UnresolvedReference,
    /// See [`ElfError::Io`].
    Io,
    /// See [`ElfError::Config`].
    Config,
}

/// Errors that can occur while decoding an ELF image.
#[derive(Debug)]
pub enum ElfError {
    /// The identification block is not a valid ELF identification.
    MalformedIdentification(IdentError),
    /// A structure or table extends past the end of the input.
    TruncatedInput {
        /// What was being read.
        what: &'static str,
        /// File offset of the read.
        offset: u64,
        /// Number of bytes requested.
        len: u64,
        /// Number of bytes in the input.
        available: u64,
    },
    /// No record layouts exist for the requested word size.
    UnsupportedLayout {
        /// Requested word size in bits.
        bits: u32,
    },
    /// An index or offset points outside the table it refers to.
    UnresolvedReference {
        /// What kind of reference failed.
        what: &'static str,
        /// The offending index or offset.
        index: u64,
        /// Number of valid entries (or bytes) in the target.
        bound: u64,
    },
    /// The underlying reader failed.
    Io(io::Error),
    /// A decoder configuration could not be parsed.
    Config(String),
}

impl ElfError {
    /// Returns the coarse kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MalformedIdentification(_) => ErrorKind::MalformedIdentification,
            Self::TruncatedInput { .. } => ErrorKind::TruncatedInput,
            Self::UnsupportedLayout { .. } => ErrorKind::UnsupportedLayout,
            Self::UnresolvedReference { .. } => ErrorKind::UnresolvedReference,
            Self::Io(_) => ErrorKind::Io,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    /// Attaches a description to a [`TruncatedInput`](Self::TruncatedInput)
    /// error; other variants pass through unchanged.
    #[must_use]
    pub(crate) fn reading(self, what: &'static str) -> Self {
        match self {
            Self::TruncatedInput {
                offset,
                len,
                available,
                ..
            } => Self::TruncatedInput {
                what,
                offset,
                len,
                available,
            },
            other => other,
        }
    }
}

impl fmt::Display for ElfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedIdentification(err) => write!(f, "malformed identification: {err}"),
            Self::TruncatedInput {
                what,
                offset,
                len,
                available,
            } => write!(
                f,
                "{what} at {offset:#x}..+{len:#x} exceeds input of {available:#x} bytes"
            ),
            Self::UnsupportedLayout { bits } => {
                write!(f, "no record layouts for {bits}-bit ELF")
            }
            Self::UnresolvedReference { what, index, bound } => {
                write!(f, "{what} {index} out of range (bound {bound})")
            }
            Self::Io(err) => write!(f, "I/O error: {err}"),
            Self::Config(msg) => write!(f, "invalid decoder configuration: {msg}"),
        }
    }
}

impl std::error::Error for ElfError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<IdentError> for ElfError {
    fn from(err: IdentError) -> Self {
        Self::MalformedIdentification(err)
    }
}

impl From<io::Error> for ElfError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<OverlayError> for ElfError {
    fn from(err: OverlayError) -> Self {
        match err {
            OverlayError::OutOfBounds {
                offset,
                len,
                available,
            } => Self::TruncatedInput {
                what: "record",
                offset: offset as u64,
                len: len as u64,
                available: available as u64,
            },
            OverlayError::LengthMismatch { expected, actual } => Self::TruncatedInput {
                what: "record",
                offset: 0,
                len: expected as u64,
                available: actual as u64,
            },
            OverlayError::InvalidStride { stride, size } => Self::TruncatedInput {
                what: "table entry",
                offset: 0,
                len: size as u64,
                available: stride as u64,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_match_variants() {
        assert_eq!(
            ElfError::from(IdentError::BadMagic([0; 4])).kind(),
            ErrorKind::MalformedIdentification
        );
        assert_eq!(
            ElfError::UnsupportedLayout { bits: 16 }.kind(),
            ErrorKind::UnsupportedLayout
        );
        assert_eq!(
            ElfError::from(io::Error::other("boom")).kind(),
            ErrorKind::Io
        );
    }

    #[test]
    fn overlay_errors_become_truncation() {
        let err = ElfError::from(OverlayError::OutOfBounds {
            offset: 8,
            len: 16,
            available: 12,
        });
        assert!(matches!(
            err,
            ElfError::TruncatedInput {
                offset: 8,
                len: 16,
                available: 12,
                ..
            }
        ));
    }

    #[test]
    fn reading_relabels_truncation_only() {
        let err = ElfError::TruncatedInput {
            what: "record",
            offset: 0,
            len: 4,
            available: 2,
        }
        .reading("section header table");
        assert!(matches!(
            err,
            ElfError::TruncatedInput {
                what: "section header table",
                ..
            }
        ));
        let other = ElfError::Config(String::from("x")).reading("ignored");
        assert_eq!(other.kind(), ErrorKind::Config);
    }

    #[test]
    fn display_errors() {
        let errors = [
            ElfError::from(IdentError::UnknownClass(7)),
            ElfError::from(IdentError::UnknownEncoding(9)),
            ElfError::UnresolvedReference {
                what: "section name",
                index: 3,
                bound: 2,
            },
            ElfError::Config(String::from("bad key")),
        ];
        for err in &errors {
            assert!(!format!("{err}").is_empty());
        }
    }
}
