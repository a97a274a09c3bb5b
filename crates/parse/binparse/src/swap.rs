//! Whole-record byte-order conversion.

use crate::endian::Endianness;

/// Converts a record between byte orders.
///
/// Swapping is type-directed: each multi-byte integer field reverses its
/// bytes, nested records and union wrappers recurse into their own
/// implementation, and single bytes (and therefore raw byte arrays such as
/// magic numbers or padding) are left untouched. `#[derive(FromBytes)]`
/// generates the field-by-field implementation for structs.
pub trait EndianSwap: Sized {
    /// Returns a copy of `self` with every integer field byte-reversed.
    #[must_use]
    fn swap_bytes(&self) -> Self;

    /// Re-encodes a record stored in `from` order into `to` order.
    #[must_use]
    fn convert(&self, from: Endianness, to: Endianness) -> Self
    where
        Self: Copy,
    {
        if from == to { *self } else { self.swap_bytes() }
    }

    /// Re-encodes a record stored in `from` order into host order.
    #[must_use]
    fn to_native(&self, from: Endianness) -> Self
    where
        Self: Copy,
    {
        self.convert(from, Endianness::NATIVE)
    }
}

impl EndianSwap for u8 {
    fn swap_bytes(&self) -> Self {
        *self
    }
}

impl EndianSwap for i8 {
    fn swap_bytes(&self) -> Self {
        *self
    }
}

macro_rules! impl_swap_native {
    ($($ty:ty),* $(,)?) => {
        $(
            impl EndianSwap for $ty {
                fn swap_bytes(&self) -> Self {
                    <$ty>::swap_bytes(*self)
                }
            }
        )*
    };
}

impl_swap_native!(u16, i16, u32, i32, u64, i64);

impl<T: EndianSwap, const N: usize> EndianSwap for [T; N] {
    fn swap_bytes(&self) -> Self {
        core::array::from_fn(|i| self[i].swap_bytes())
    }
}
