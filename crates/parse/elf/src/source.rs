//! Byte sources a [`Session`](crate::Session) decodes from.
//!
//! [`EagerSource`] holds the whole image in memory and hands out borrowed
//! slices. [`LazySource`] issues one positioned read per structure against
//! a seekable handle and leaves the handle's cursor where it found it.

use std::borrow::Cow;
use std::cell::RefCell;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use crate::error::ElfError;

/// Random access to the bytes of an ELF image.
pub trait Source {
    /// Total number of bytes in the image.
    fn len(&self) -> u64;

    /// Returns `true` if the image is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads `len` bytes starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::TruncatedInput`] if the span extends past the end
    /// of the image, or [`ElfError::Io`] if the underlying reader fails.
    fn read_at(&self, offset: u64, len: usize) -> Result<Cow<'_, [u8]>, ElfError>;
}

fn check_span(offset: u64, len: usize, available: u64) -> Result<(), ElfError> {
    let len = len as u64;
    match offset.checked_add(len) {
        Some(end) if end <= available => Ok(()),
        _ => Err(ElfError::TruncatedInput {
            what: "data",
            offset,
            len,
            available,
        }),
    }
}

/// A fully buffered image. Reads are zero-copy slices of the buffer.
#[derive(Debug, Clone)]
pub struct EagerSource<'a> {
    data: Cow<'a, [u8]>,
}

impl<'a> EagerSource<'a> {
    /// Wraps a borrowed buffer.
    #[must_use]
    pub fn from_bytes(data: &'a [u8]) -> Self {
        Self {
            data: Cow::Borrowed(data),
        }
    }

    /// Takes ownership of a buffer.
    #[must_use]
    pub fn from_vec(data: Vec<u8>) -> EagerSource<'static> {
        EagerSource {
            data: Cow::Owned(data),
        }
    }

    /// Returns the whole buffer.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

impl EagerSource<'static> {
    /// Reads everything remaining in `reader` into memory.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::Io`] if reading fails.
    pub fn read<R: Read>(mut reader: R) -> Result<Self, ElfError> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Ok(Self::from_vec(data))
    }

    /// Reads the file at `path` into memory.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::Io`] if the file cannot be read.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ElfError> {
        Ok(Self::from_vec(std::fs::read(path)?))
    }
}

impl Source for EagerSource<'_> {
    fn len(&self) -> u64 {
        self.data.len() as u64
    }

    fn read_at(&self, offset: u64, len: usize) -> Result<Cow<'_, [u8]>, ElfError> {
        check_span(offset, len, self.len())?;
        // In range of a slice length, so both fit in usize.
        #[expect(clippy::cast_possible_truncation)]
        let start = offset as usize;
        Ok(Cow::Borrowed(&self.data[start..start + len]))
    }
}

/// A seekable handle read on demand.
///
/// Offsets are relative to the cursor position at construction, so an ELF
/// image embedded in a larger stream can be decoded in place. Every read
/// restores the cursor afterwards, which lets unrelated readers of the
/// same handle interleave with the decoder.
#[derive(Debug)]
pub struct LazySource<R> {
    reader: RefCell<R>,
    base: u64,
    len: u64,
}

impl<R: Read + Seek> LazySource<R> {
    /// Wraps `reader`, treating its current position as offset zero.
    ///
    /// The cursor is left where it was.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::Io`] if the handle cannot be seeked.
    pub fn new(mut reader: R) -> Result<Self, ElfError> {
        let base = reader.stream_position()?;
        let end = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(base))?;
        Ok(Self {
            reader: RefCell::new(reader),
            base,
            len: end.saturating_sub(base),
        })
    }

    /// Returns the underlying handle.
    pub fn into_inner(self) -> R {
        self.reader.into_inner()
    }
}

impl LazySource<File> {
    /// Opens the file at `path` for on-demand reading.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::Io`] if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ElfError> {
        Self::new(File::open(path)?)
    }
}

fn read_exact_at<R: Read + Seek>(reader: &mut R, pos: u64, len: usize) -> io::Result<Vec<u8>> {
    reader.seek(SeekFrom::Start(pos))?;
    let mut buf = vec![0; len];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

impl<R: Read + Seek> Source for LazySource<R> {
    fn len(&self) -> u64 {
        self.len
    }

    fn read_at(&self, offset: u64, len: usize) -> Result<Cow<'_, [u8]>, ElfError> {
        check_span(offset, len, self.len)?;
        let mut reader = self.reader.borrow_mut();
        let saved = reader.stream_position()?;
        let result = read_exact_at(&mut *reader, self.base + offset, len);
        reader.seek(SeekFrom::Start(saved))?;
        Ok(Cow::Owned(result?))
    }
}

impl<S: Source + ?Sized> Source for &S {
    fn len(&self) -> u64 {
        (**self).len()
    }

    fn read_at(&self, offset: u64, len: usize) -> Result<Cow<'_, [u8]>, ElfError> {
        (**self).read_at(offset, len)
    }
}

impl<S: Source + ?Sized> Source for Box<S> {
    fn len(&self) -> u64 {
        (**self).len()
    }

    fn read_at(&self, offset: u64, len: usize) -> Result<Cow<'_, [u8]>, ElfError> {
        (**self).read_at(offset, len)
    }
}
