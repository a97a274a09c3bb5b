//! The [`FromBytes`] and [`AsBytes`] marker traits.

use core::mem::{align_of, size_of};

/// Types that can be safely created from any sequence of bytes.
///
/// # Safety
///
/// Implementors must guarantee that every bit pattern of
/// `size_of::<Self>()` bytes is a valid value of `Self`. In practice this
/// means integers, byte arrays, and `#[repr(C)]` structs composed only of
/// such fields. Use `#[derive(FromBytes)]` rather than implementing this by
/// hand for structs.
pub unsafe trait FromBytes: Copy + 'static {
    /// Copies a value out of the start of `data`.
    ///
    /// Returns `None` if `data` is shorter than `size_of::<Self>()`.
    #[must_use]
    fn read_from(data: &[u8]) -> Option<Self> {
        Self::read_at(data, 0)
    }

    /// Copies a value out of `data` at byte offset `offset`.
    ///
    /// Returns `None` if the span does not fit inside `data`.
    #[must_use]
    fn read_at(data: &[u8], offset: usize) -> Option<Self> {
        let end = offset.checked_add(size_of::<Self>())?;
        let bytes = data.get(offset..end)?;
        // SAFETY: `bytes` holds exactly `size_of::<Self>()` initialized bytes,
        // every bit pattern is valid for `Self` (trait contract), and
        // `read_unaligned` has no alignment requirement.
        Some(unsafe { bytes.as_ptr().cast::<Self>().read_unaligned() })
    }

    /// Reinterprets the bytes of `data` at `offset` as a `&Self` without
    /// copying.
    ///
    /// Returns `None` if the span does not fit, or if `Self` has an
    /// alignment greater than one (the byte-backed records of this crate
    /// all have alignment one).
    #[must_use]
    fn ref_at(data: &[u8], offset: usize) -> Option<&Self> {
        if align_of::<Self>() != 1 {
            return None;
        }
        let end = offset.checked_add(size_of::<Self>())?;
        let bytes = data.get(offset..end)?;
        // SAFETY: the span is in bounds and sized for `Self`, alignment one
        // makes any address valid, and every bit pattern is a valid `Self`.
        // The returned reference borrows `data`, so it cannot outlive it.
        Some(unsafe { &*bytes.as_ptr().cast::<Self>() })
    }

    /// Reinterprets `count` consecutive records starting at `offset` as a
    /// slice without copying.
    ///
    /// This is a single bounds check over the whole span, not a
    /// per-element decode. Returns `None` under the same conditions as
    /// [`ref_at`](Self::ref_at).
    #[must_use]
    fn slice_at(data: &[u8], offset: usize, count: usize) -> Option<&[Self]> {
        if align_of::<Self>() != 1 {
            return None;
        }
        let len = count.checked_mul(size_of::<Self>())?;
        let end = offset.checked_add(len)?;
        let bytes = data.get(offset..end)?;
        // SAFETY: `bytes` covers exactly `count` records, alignment one
        // makes the start pointer valid for `Self`, and every bit pattern is
        // a valid `Self`.
        Some(unsafe { core::slice::from_raw_parts(bytes.as_ptr().cast::<Self>(), count) })
    }
}

/// Types whose in-memory representation can be viewed as plain bytes.
///
/// # Safety
///
/// Implementors must not contain padding or any other uninitialized bytes.
/// `#[derive(FromBytes)]` implements this trait after asserting at compile
/// time that the struct has no padding.
pub unsafe trait AsBytes: Sized {
    /// Returns the raw bytes backing `self`.
    #[must_use]
    fn as_bytes(&self) -> &[u8] {
        // SAFETY: `Self` has no padding (trait contract), so all
        // `size_of::<Self>()` bytes behind the reference are initialized.
        unsafe {
            core::slice::from_raw_parts(core::ptr::from_ref(self).cast::<u8>(), size_of::<Self>())
        }
    }
}

/// Views a slice of records as its raw bytes.
#[must_use]
pub fn slice_as_bytes<T: AsBytes>(records: &[T]) -> &[u8] {
    // SAFETY: every `T` is padding-free, and slices have no padding between
    // elements, so the whole span is initialized.
    unsafe { core::slice::from_raw_parts(records.as_ptr().cast::<u8>(), size_of_val(records)) }
}

macro_rules! impl_plain {
    ($($ty:ty),* $(,)?) => {
        $(
            // SAFETY: primitive integers accept every bit pattern and have no padding.
            unsafe impl FromBytes for $ty {}
            // SAFETY: as above.
            unsafe impl AsBytes for $ty {}
        )*
    };
}

impl_plain!(u8, i8, u16, i16, u32, i32, u64, i64);

// SAFETY: an array of `FromBytes` values is valid for any bit pattern.
unsafe impl<T: FromBytes, const N: usize> FromBytes for [T; N] {}

// SAFETY: arrays have no padding between elements and `T` has none inside.
unsafe impl<T: AsBytes, const N: usize> AsBytes for [T; N] {}
