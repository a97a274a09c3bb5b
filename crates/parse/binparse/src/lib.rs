//! Zero-copy overlays of packed binary records.
//!
//! Binary formats such as ELF store their structures exactly as they are
//! laid out in memory, apart from byte order. This crate lets a `#[repr(C)]`
//! Rust struct be laid directly over a byte buffer:
//!
//! - [`FromBytes`] marks types for which every bit pattern is valid, so a
//!   byte span can be reinterpreted (or copied) as the type.
//! - [`AsBytes`] marks padding-free types whose bytes can be viewed back.
//! - [`U16`], [`U32`], [`U64`], [`I32`] and [`I64`] store integers as raw
//!   bytes (alignment 1) and decode them for a given [`Endianness`].
//! - [`EndianSwap`] converts whole records between byte orders, recursing
//!   into nested records and leaving raw byte arrays untouched.
//! - [`Record`] and [`Table`] are the borrowed-or-owned views handed out to
//!   callers.
//!
//! # Usage
//!
//! ```
//! use kestrel_binparse::{Endianness, FromBytes, Record, U32};
//!
//! #[derive(Clone, Copy, Debug, FromBytes)]
//! #[repr(C)]
//! struct NoteHeader {
//!     namesz: U32,
//!     descsz: U32,
//!     kind: U32,
//! }
//!
//! let bytes = [4, 0, 0, 0, 16, 0, 0, 0, 3, 0, 0, 0];
//! let note = Record::<NoteHeader>::read(&bytes, 0).unwrap();
//! assert_eq!(note.kind.get(Endianness::Little), 3);
//! ```

#![cfg_attr(not(test), no_std)]

extern crate alloc;

// Lets the derive macro's `kestrel_binparse::` paths resolve inside this crate.
extern crate self as kestrel_binparse;

pub mod bytes;
pub mod endian;
pub mod error;
pub mod record;
pub mod swap;
pub mod table;

pub use bytes::{AsBytes, FromBytes};
pub use endian::{Endianness, I32, I64, U16, U32, U64};
pub use error::OverlayError;
pub use kestrel_binparse_macros::FromBytes;
pub use record::Record;
pub use swap::EndianSwap;
pub use table::Table;
