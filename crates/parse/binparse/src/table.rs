//! Arrays of fixed-size records.

use alloc::vec::Vec;
use core::ops::Deref;

use crate::bytes::FromBytes;
use crate::error::{OverlayError, span};

/// A sequence of records read from a contiguous table.
///
/// When the table's stride equals the record size the records are a single
/// zero-copy view into the buffer. Tables whose producer padded each entry
/// (stride larger than the record) are gathered into an owned vector.
#[derive(Debug, Clone)]
pub struct Table<'a, T: FromBytes> {
    repr: Repr<'a, T>,
}

#[derive(Debug, Clone)]
enum Repr<'a, T> {
    Borrowed(&'a [T]),
    Owned(Vec<T>),
}

impl<'a, T: FromBytes> Table<'a, T> {
    /// Reads `count` records of `stride` bytes each, starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`OverlayError::InvalidStride`] if `stride` is smaller than
    /// the record, or [`OverlayError::OutOfBounds`] if the table does not
    /// fit inside `data`.
    pub fn parse(
        data: &'a [u8],
        offset: usize,
        count: usize,
        stride: usize,
    ) -> Result<Self, OverlayError> {
        let size = size_of::<T>();
        if stride < size {
            return Err(OverlayError::InvalidStride { stride, size });
        }
        let overflow = OverlayError::OutOfBounds {
            offset,
            len: usize::MAX,
            available: data.len(),
        };
        let len = match count {
            0 => 0,
            n => (n - 1)
                .checked_mul(stride)
                .and_then(|l| l.checked_add(size))
                .ok_or(overflow)?,
        };
        let bytes = span(data, offset, len)?;

        if stride == size {
            if let Some(records) = T::slice_at(bytes, 0, count) {
                return Ok(Self {
                    repr: Repr::Borrowed(records),
                });
            }
        }

        let records = (0..count)
            .map(|i| T::read_at(bytes, i * stride).ok_or(overflow))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            repr: Repr::Owned(records),
        })
    }

    /// Reads as many whole records as fit in `data` (trailing bytes that do
    /// not form a full record are ignored).
    #[must_use]
    pub fn from_bytes(data: &'a [u8]) -> Self {
        let count = data.len().checked_div(size_of::<T>()).unwrap_or(0);
        match T::slice_at(data, 0, count) {
            Some(records) => Self {
                repr: Repr::Borrowed(records),
            },
            None => Self {
                repr: Repr::Owned(
                    (0..count)
                        .filter_map(|i| T::read_at(data, i * size_of::<T>()))
                        .collect(),
                ),
            },
        }
    }

    /// Returns the records as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        match &self.repr {
            Repr::Borrowed(records) => records,
            Repr::Owned(records) => records,
        }
    }

    /// Returns `true` if the records are a view into the source buffer.
    #[must_use]
    pub fn is_borrowed(&self) -> bool {
        matches!(self.repr, Repr::Borrowed(_))
    }

    /// Converts into an owned table detached from the source buffer.
    #[must_use]
    pub fn into_owned(self) -> Table<'static, T> {
        let records = match self.repr {
            Repr::Borrowed(records) => records.to_vec(),
            Repr::Owned(records) => records,
        };
        Table {
            repr: Repr::Owned(records),
        }
    }
}

impl<T: FromBytes> Deref for Table<'_, T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Endianness, U32};

    fn words(values: &[u32], pad: usize) -> Vec<u8> {
        let mut out = Vec::new();
        for v in values {
            out.extend_from_slice(&v.to_be_bytes());
            out.extend(core::iter::repeat_n(0xEE, pad));
        }
        out
    }

    #[test]
    fn packed_table_is_zero_copy() {
        let data = words(&[1, 2, 3], 0);
        let table = Table::<U32>::parse(&data, 0, 3, 4).unwrap();
        assert!(table.is_borrowed());
        let decoded: Vec<_> = table.iter().map(|w| w.get(Endianness::Big)).collect();
        assert_eq!(decoded, [1, 2, 3]);
    }

    #[test]
    fn padded_table_honours_stride() {
        let data = words(&[10, 20], 4);
        let table = Table::<U32>::parse(&data, 0, 2, 8).unwrap();
        assert!(!table.is_borrowed());
        assert_eq!(table[0].get(Endianness::Big), 10);
        assert_eq!(table[1].get(Endianness::Big), 20);
    }

    #[test]
    fn last_entry_needs_only_record_size() {
        // Two 8-byte strided entries but no trailing pad after the last one.
        let mut data = words(&[10, 20], 4);
        data.truncate(12);
        let table = Table::<U32>::parse(&data, 0, 2, 8).unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn truncated_table_fails() {
        let data = words(&[1, 2], 0);
        assert!(matches!(
            Table::<U32>::parse(&data, 0, 3, 4),
            Err(OverlayError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn small_stride_is_rejected() {
        let data = words(&[1, 2], 0);
        assert_eq!(
            Table::<U32>::parse(&data, 0, 2, 2).unwrap_err(),
            OverlayError::InvalidStride { stride: 2, size: 4 }
        );
    }

    #[test]
    fn empty_table_at_end_of_buffer() {
        let data = words(&[1], 0);
        let table = Table::<U32>::parse(&data, 4, 0, 4).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn from_bytes_ignores_trailing_bytes() {
        let mut data = words(&[5, 6], 0);
        data.push(0xFF);
        let table = Table::<U32>::from_bytes(&data);
        assert_eq!(table.len(), 2);
        assert_eq!(table.into_owned()[1].get(Endianness::Big), 6);
    }
}
