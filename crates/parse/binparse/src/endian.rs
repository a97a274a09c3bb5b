//! Byte-order selection and byte-backed integer fields.
//!
//! Integer fields are stored as raw byte arrays so records have alignment
//! one and can be overlaid at any offset. Decoding reads the bytes in host
//! order and swaps them when the requested order differs from the host's.

use core::fmt;

use crate::bytes::{AsBytes, FromBytes};
use crate::swap::EndianSwap;

/// Byte order of multi-byte integers in a binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endianness {
    /// Least significant byte first.
    Little,
    /// Most significant byte first.
    Big,
}

impl Endianness {
    /// Byte order of the host this code runs on.
    #[cfg(target_endian = "little")]
    pub const NATIVE: Self = Self::Little;
    /// Byte order of the host this code runs on.
    #[cfg(target_endian = "big")]
    pub const NATIVE: Self = Self::Big;

    /// Returns `true` if this is the host byte order.
    #[must_use]
    pub fn is_native(self) -> bool {
        self == Self::NATIVE
    }

    /// Returns the other byte order.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Little => Self::Big,
            Self::Big => Self::Little,
        }
    }
}

impl fmt::Display for Endianness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Little => f.write_str("little-endian"),
            Self::Big => f.write_str("big-endian"),
        }
    }
}

macro_rules! endian_int {
    ($(#[$meta:meta])* $name:ident, $prim:ty, $len:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
        #[repr(transparent)]
        pub struct $name([u8; $len]);

        // SAFETY: `repr(transparent)` over a byte array; all bit patterns are valid.
        unsafe impl FromBytes for $name {}
        // SAFETY: a byte array has no padding.
        unsafe impl AsBytes for $name {}

        impl $name {
            /// Wraps raw bytes exactly as they appear in the file.
            #[must_use]
            pub const fn from_raw(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            /// Encodes `value` in the given byte order.
            #[must_use]
            pub fn new(value: $prim, order: Endianness) -> Self {
                let value = if order.is_native() { value } else { value.swap_bytes() };
                Self(value.to_ne_bytes())
            }

            /// Decodes the value in the given byte order.
            #[must_use]
            pub fn get(self, order: Endianness) -> $prim {
                let value = <$prim>::from_ne_bytes(self.0);
                if order.is_native() { value } else { value.swap_bytes() }
            }

            /// Replaces the value, encoding it in the given byte order.
            pub fn set(&mut self, value: $prim, order: Endianness) {
                *self = Self::new(value, order);
            }

            /// Returns the raw bytes as stored.
            #[must_use]
            pub const fn to_raw(self) -> [u8; $len] {
                self.0
            }
        }

        impl EndianSwap for $name {
            fn swap_bytes(&self) -> Self {
                let mut bytes = self.0;
                bytes.reverse();
                Self(bytes)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({:02x?})", stringify!($name), self.0)
            }
        }
    };
}

endian_int!(
    /// A `u16` stored as two raw bytes.
    U16, u16, 2
);
endian_int!(
    /// A `u32` stored as four raw bytes.
    U32, u32, 4
);
endian_int!(
    /// A `u64` stored as eight raw bytes.
    U64, u64, 8
);
endian_int!(
    /// An `i32` stored as four raw bytes.
    I32, i32, 4
);
endian_int!(
    /// An `i64` stored as eight raw bytes.
    I64, i64, 8
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_both_orders() {
        let word = U32::from_raw([0x12, 0x34, 0x56, 0x78]);
        assert_eq!(word.get(Endianness::Big), 0x1234_5678);
        assert_eq!(word.get(Endianness::Little), 0x7856_3412);
    }

    #[test]
    fn new_then_get_is_identity() {
        for order in [Endianness::Little, Endianness::Big] {
            assert_eq!(U64::new(0x0102_0304_0506_0708, order).get(order), 0x0102_0304_0506_0708);
            assert_eq!(I64::new(-5, order).get(order), -5);
            assert_eq!(I32::new(i32::MIN, order).get(order), i32::MIN);
            assert_eq!(U16::new(0xBEEF, order).get(order), 0xBEEF);
        }
    }

    #[test]
    fn encodes_expected_bytes() {
        assert_eq!(U16::new(0x0102, Endianness::Big).to_raw(), [1, 2]);
        assert_eq!(U16::new(0x0102, Endianness::Little).to_raw(), [2, 1]);
    }

    #[test]
    fn swap_converts_between_orders() {
        let big = U32::new(0xCAFE_F00D, Endianness::Big);
        assert_eq!(big.swap_bytes().get(Endianness::Little), 0xCAFE_F00D);
        assert_eq!(big.swap_bytes().swap_bytes(), big);
    }

    #[test]
    fn set_overwrites_value() {
        let mut half = U16::default();
        half.set(0x1234, Endianness::Big);
        assert_eq!(half.to_raw(), [0x12, 0x34]);
    }

    #[test]
    fn native_is_consistent() {
        assert!(Endianness::NATIVE.is_native());
        assert!(!Endianness::NATIVE.opposite().is_native());
    }
}
