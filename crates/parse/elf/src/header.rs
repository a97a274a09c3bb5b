//! The ELF file header, widened to a class-independent form.

use crate::ident::Ident;
use crate::types::{Machine, ObjectType};

/// Decoded file header. Address and offset fields are widened to 64 bits
/// for ELF32 inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    /// The identification block.
    pub ident: Ident,
    /// Object file type.
    pub e_type: ObjectType,
    /// Target machine architecture.
    pub e_machine: Machine,
    /// Object file version.
    pub e_version: u32,
    /// Virtual address of the entry point.
    pub e_entry: u64,
    /// Offset of the program header table in the file.
    pub e_phoff: u64,
    /// Offset of the section header table in the file.
    pub e_shoff: u64,
    /// Processor-specific flags.
    pub e_flags: u32,
    /// Declared size of this header.
    pub e_ehsize: u16,
    /// Declared size of each program header entry.
    pub e_phentsize: u16,
    /// Number of program header entries.
    pub e_phnum: u16,
    /// Declared size of each section header entry.
    pub e_shentsize: u16,
    /// Number of section header entries.
    pub e_shnum: u16,
    /// Section header string table index.
    pub e_shstrndx: u16,
}
