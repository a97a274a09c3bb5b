//! Structural decoder for ELF32 and ELF64 images of either byte order.
//!
//! Records are overlaid on the input with [`kestrel_binparse`]: each ELF
//! structure is a `#[repr(C)]` struct of byte-backed integers, so tables
//! are bounds-checked once and then read in place. The class-specific
//! records are widened into one set of 64-bit models, and a [`Session`]
//! cross-resolves them: section and symbol names, dynamic dependencies,
//! relocations with their symbols, notes and symbol versions.
//!
//! # Usage
//!
//! ```no_run
//! use kestrel_elf::{DecodeConfig, Session};
//!
//! # fn main() -> Result<(), kestrel_elf::ElfError> {
//! let mut session = Session::open("/usr/bin/true", &DecodeConfig::default())?;
//! for lib in session.needed_libraries() {
//!     println!("needs {lib}");
//! }
//! for reloc in session.relocations() {
//!     println!("{:#x} {} {:?}", reloc.offset, reloc.kind, reloc.symbol_name);
//! }
//! session.rebase(0x5555_5555_4000);
//! # Ok(())
//! # }
//! ```
//!
//! Malformed input is reported, never panicked on:
//!
//! ```
//! use kestrel_elf::{ErrorKind, Session};
//!
//! let err = Session::from_bytes(b"\x7fELF\x03\x01\x01\0\0\0\0\0\0\0\0\0").unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::MalformedIdentification);
//! ```

pub mod bits;
pub mod class;
pub mod config;
pub mod dynamic;
pub mod error;
pub mod header;
pub mod ident;
pub mod layout;
pub mod note;
pub mod raw;
pub mod reloc;
pub mod section;
pub mod segment;
pub mod session;
pub mod source;
pub mod symbol;
pub mod types;
pub mod version;

pub use kestrel_binparse::Endianness;

pub use class::{Elf32, Elf64, ElfClass, RelocationRecord};
pub use config::{Backing, DecodeConfig, ZeroSymbolPolicy};
pub use dynamic::DynamicEntry;
pub use error::{ElfError, ErrorKind, IdentError};
pub use header::FileHeader;
pub use ident::{Class, ELF_MAGIC, Ident};
pub use layout::{Layout, LayoutSet, layouts_for, layouts_for_bits};
pub use note::Note;
pub use reloc::{Relocation, RelocationArch, RelocationType, relocation_arch_for_machine};
pub use section::{Section, SectionHeader, StringTable};
pub use segment::{ProgramHeader, Segment};
pub use session::Session;
pub use source::{EagerSource, LazySource, Source};
pub use symbol::{Symbol, SymbolRecord, SymbolTable};
pub use types::{
    DynamicFlags1, DynamicTag, Machine, ObjectType, OsAbi, SectionFlags, SectionType,
    SegmentFlags, SegmentType, SymbolBinding, SymbolType, SymbolVisibility,
};
pub use version::{VersionDefinition, VersionNeed, VersionNeedEntry};
