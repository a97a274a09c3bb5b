//! Section headers and string tables.

use std::borrow::Cow;

use crate::error::ElfError;
use crate::types::{SectionFlags, SectionType};

/// A section header with every field widened to its 64-bit form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionHeader {
    /// Offset into the section header string table for this section's name.
    pub sh_name: u32,
    /// Section type.
    pub sh_type: u32,
    /// Section flags.
    pub sh_flags: u64,
    /// Virtual address of the section in memory (0 for non-loaded sections).
    pub sh_addr: u64,
    /// File offset of the section data.
    pub sh_offset: u64,
    /// Size of the section data in bytes.
    pub sh_size: u64,
    /// Associated section index (e.g., `.strtab` index for `.symtab`).
    pub sh_link: u32,
    /// Extra info (interpretation depends on section type).
    pub sh_info: u32,
    /// Required alignment of the section.
    pub sh_addralign: u64,
    /// Size of each entry (for sections with fixed-size entries).
    pub sh_entsize: u64,
}

/// A section with its resolved name and typed attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Position in the section header table.
    pub index: usize,
    /// Name from the section header string table (empty if the file has
    /// none).
    pub name: String,
    /// Section type.
    pub kind: SectionType,
    /// Section flags.
    pub flags: SectionFlags,
    /// The raw header.
    pub header: SectionHeader,
}

impl Section {
    /// Virtual address of the section.
    #[must_use]
    pub fn address(&self) -> u64 {
        self.header.sh_addr
    }

    /// File offset of the section data.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.header.sh_offset
    }

    /// Size of the section in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.header.sh_size
    }

    /// Returns `true` if the section occupies bytes in the file.
    #[must_use]
    pub fn has_file_data(&self) -> bool {
        self.kind != SectionType::NoBits && self.kind != SectionType::Null
    }
}

/// A NUL-terminated string table.
///
/// Strings are not split up front; each offset is resolved on demand.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringTable {
    data: Vec<u8>,
}

impl StringTable {
    /// Creates a string table from the raw section data.
    #[must_use]
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// A table holding no strings. Only offset 0 resolves, to `""`.
    #[must_use]
    pub const fn empty() -> Self {
        Self { data: Vec::new() }
    }

    /// Returns the raw table bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Returns the bytes of the string at `offset`, without its
    /// terminator. A string running off the end of the table ends there.
    ///
    /// Returns `None` if the offset is out of bounds.
    #[must_use]
    pub fn get_bytes(&self, offset: u32) -> Option<&[u8]> {
        let remaining = self.data.get(offset as usize..)?;
        if remaining.is_empty() && offset != 0 {
            return None;
        }
        let end = remaining.iter().position(|&b| b == 0).unwrap_or(remaining.len());
        Some(&remaining[..end])
    }

    /// Looks up a NUL-terminated string at the given byte offset.
    ///
    /// Returns `None` if the offset is out of bounds or the string
    /// contains invalid UTF-8.
    #[must_use]
    pub fn get(&self, offset: u32) -> Option<&str> {
        core::str::from_utf8(self.get_bytes(offset)?).ok()
    }

    /// Resolves the string at `offset`, replacing invalid UTF-8.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::UnresolvedReference`] if the offset lies outside
    /// the table.
    pub fn resolve(&self, offset: u32, what: &'static str) -> Result<String, ElfError> {
        let bytes = self
            .get_bytes(offset)
            .ok_or(ElfError::UnresolvedReference {
                what,
                index: u64::from(offset),
                bound: self.data.len() as u64,
            })?;
        Ok(match String::from_utf8_lossy(bytes) {
            Cow::Borrowed(s) => s.to_owned(),
            Cow::Owned(s) => {
                log::warn!("{what} at offset {offset:#x} is not valid UTF-8");
                s
            }
        })
    }
}
