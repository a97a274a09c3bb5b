//! Borrowed-or-owned record overlays.

use core::ops::Deref;

use crate::bytes::{AsBytes, FromBytes};
use crate::error::{OverlayError, span};

/// A single record laid over a byte buffer.
///
/// A record either borrows a read-only view into a buffer owned elsewhere
/// ([`Record::read`]) or owns its bytes outright ([`Record::copy`],
/// [`Record::new`]). Writing to a borrowed record first detaches it into
/// owned storage; the source buffer is never mutated through a record.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a, T: FromBytes> {
    repr: Repr<'a, T>,
}

#[derive(Debug, Clone, Copy)]
enum Repr<'a, T> {
    Borrowed(&'a T),
    Owned(T),
}

impl<'a, T: FromBytes + AsBytes> Record<'a, T> {
    /// Overlays a record on `data` at `offset` without copying.
    ///
    /// Falls back to an owned copy if `T` has an alignment greater than
    /// one.
    ///
    /// # Errors
    ///
    /// Returns [`OverlayError::OutOfBounds`] if the record does not fit.
    pub fn read(data: &'a [u8], offset: usize) -> Result<Self, OverlayError> {
        let bytes = span(data, offset, size_of::<T>())?;
        let repr = match T::ref_at(bytes, 0) {
            Some(view) => Repr::Borrowed(view),
            None => Repr::Owned(T::read_from(bytes).ok_or(OverlayError::OutOfBounds {
                offset,
                len: size_of::<T>(),
                available: data.len(),
            })?),
        };
        Ok(Self { repr })
    }

    /// Wraps an owned value.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            repr: Repr::Owned(value),
        }
    }

    /// Returns the decoded record.
    #[must_use]
    pub fn get(&self) -> &T {
        match &self.repr {
            Repr::Borrowed(view) => view,
            Repr::Owned(value) => value,
        }
    }

    /// Returns `true` if this record is a view into another buffer.
    #[must_use]
    pub fn is_borrowed(&self) -> bool {
        matches!(self.repr, Repr::Borrowed(_))
    }

    /// Returns the bytes backing the record.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.get().as_bytes()
    }

    /// Produces an independent record with its own backing, decoupled from
    /// the lifetime of the original buffer.
    #[must_use]
    pub fn copy(&self) -> Record<'static, T> {
        Record::new(*self.get())
    }

    /// Overwrites the record's backing with `bytes`.
    ///
    /// A borrowed record is detached into owned storage first, so the
    /// buffer it was read from is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`OverlayError::LengthMismatch`] if `bytes` is not exactly
    /// `size_of::<T>()` long.
    pub fn write(&mut self, bytes: &[u8]) -> Result<(), OverlayError> {
        let mismatch = OverlayError::LengthMismatch {
            expected: size_of::<T>(),
            actual: bytes.len(),
        };
        if bytes.len() != size_of::<T>() {
            return Err(mismatch);
        }
        let value = T::read_from(bytes).ok_or(mismatch)?;
        self.repr = Repr::Owned(value);
        Ok(())
    }

    /// Returns a mutable reference, detaching a borrowed record first.
    pub fn to_mut(&mut self) -> &mut T {
        match self.repr {
            Repr::Owned(ref mut value) => value,
            Repr::Borrowed(view) => {
                self.repr = Repr::Owned(*view);
                self.to_mut()
            }
        }
    }

    /// Consumes the record, returning the decoded value.
    #[must_use]
    pub fn into_inner(self) -> T {
        *self.get()
    }
}

impl<T: FromBytes + AsBytes> Deref for Record<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.get()
    }
}

impl<T: FromBytes + AsBytes + PartialEq> PartialEq for Record<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        self.get() == other.get()
    }
}
