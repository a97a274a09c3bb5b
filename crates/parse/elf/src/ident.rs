//! The identification block (`e_ident`).

use core::fmt;

use kestrel_binparse::{Endianness, FromBytes};

use crate::error::{ElfError, IdentError};
use crate::raw::ElfIdent;
use crate::types::OsAbi;

/// ELF magic bytes: `\x7fELF`.
pub const ELF_MAGIC: [u8; 4] = [0x7f, b'E', b'L', b'F'];

/// Size of the identification block.
pub const EI_NIDENT: usize = 16;

const ELFCLASS32: u8 = 1;
const ELFCLASS64: u8 = 2;
const ELFDATA2LSB: u8 = 1;
const ELFDATA2MSB: u8 = 2;

/// Word size of an ELF file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Class {
    /// `ELFCLASS32`.
    Elf32,
    /// `ELFCLASS64`.
    Elf64,
}

impl Class {
    /// Word size in bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        match self {
            Self::Elf32 => 32,
            Self::Elf64 => 64,
        }
    }

    /// The `EI_CLASS` byte for this class.
    #[must_use]
    pub const fn raw(self) -> u8 {
        match self {
            Self::Elf32 => ELFCLASS32,
            Self::Elf64 => ELFCLASS64,
        }
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ELF{}", self.bits())
    }
}

/// The decoded identification block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ident {
    /// Word size.
    pub class: Class,
    /// Byte order of every multi-byte field that follows.
    pub endianness: Endianness,
    /// `EI_VERSION`.
    pub version: u8,
    /// Target OS ABI.
    pub os_abi: OsAbi,
    /// ABI version.
    pub abi_version: u8,
}

impl Ident {
    /// Decodes the identification block from the first 16 bytes of `data`.
    ///
    /// The magic number is checked before anything else.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::TruncatedInput`] if fewer than 16 bytes are
    /// available, or [`ElfError::MalformedIdentification`] for a bad magic
    /// number, class or data encoding.
    pub fn parse(data: &[u8]) -> Result<Self, ElfError> {
        let magic_len = data.len().min(ELF_MAGIC.len());
        if data[..magic_len] != ELF_MAGIC[..magic_len] {
            let mut magic = [0; 4];
            magic[..magic_len].copy_from_slice(&data[..magic_len]);
            return Err(IdentError::BadMagic(magic).into());
        }
        let raw = ElfIdent::read_from(data).ok_or(ElfError::TruncatedInput {
            what: "identification",
            offset: 0,
            len: EI_NIDENT as u64,
            available: data.len() as u64,
        })?;
        Self::from_raw(&raw)
    }

    /// Decodes an already-overlaid identification block.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::MalformedIdentification`] for a bad magic
    /// number, class or data encoding.
    pub fn from_raw(raw: &ElfIdent) -> Result<Self, ElfError> {
        if raw.ei_magic != ELF_MAGIC {
            return Err(IdentError::BadMagic(raw.ei_magic).into());
        }
        let class = match raw.ei_class {
            ELFCLASS32 => Class::Elf32,
            ELFCLASS64 => Class::Elf64,
            other => return Err(IdentError::UnknownClass(other).into()),
        };
        let endianness = match raw.ei_data {
            ELFDATA2LSB => Endianness::Little,
            ELFDATA2MSB => Endianness::Big,
            other => return Err(IdentError::UnknownEncoding(other).into()),
        };
        Ok(Self {
            class,
            endianness,
            version: raw.ei_version,
            os_abi: OsAbi::from_raw(raw.ei_osabi),
            abi_version: raw.ei_abiversion,
        })
    }
}
