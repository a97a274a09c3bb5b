//! Word-size specific record types and their widening into the
//! class-independent models.
//!
//! Every per-class difference in the format is confined to an [`ElfClass`]
//! implementation. The decoder is written once against this trait and
//! instantiated for [`Elf32`] and [`Elf64`].

use kestrel_binparse::{Endianness, FromBytes};

use crate::bits;
use crate::dynamic::DynamicEntry;
use crate::header::FileHeader;
use crate::ident::{Class, Ident};
use crate::raw;
use crate::section::SectionHeader;
use crate::segment::ProgramHeader;
use crate::symbol::SymbolRecord;
use crate::types::{Machine, ObjectType};

/// A relocation entry with `r_info` already split into its symbol index
/// and type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelocationRecord {
    /// Location to patch.
    pub r_offset: u64,
    /// Packed symbol index and type, widened.
    pub r_info: u64,
    /// Symbol table index.
    pub r_sym: u32,
    /// Machine-specific type code.
    pub r_type: u32,
    /// Explicit addend, present only for `SHT_RELA` entries.
    pub r_addend: Option<i64>,
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Elf32 {}
    impl Sealed for super::Elf64 {}
}

/// The record types and widening rules of one ELF class.
pub trait ElfClass: sealed::Sealed + 'static {
    /// The class this implementation decodes.
    const CLASS: Class;

    /// `ElfN_Ehdr`.
    type Ehdr: FromBytes;
    /// `ElfN_Shdr`.
    type Shdr: FromBytes;
    /// `ElfN_Phdr`.
    type Phdr: FromBytes;
    /// `ElfN_Sym`.
    type Sym: FromBytes;
    /// `ElfN_Dyn`.
    type Dyn: FromBytes;
    /// `ElfN_Rel`.
    type Rel: FromBytes;
    /// `ElfN_Rela`.
    type Rela: FromBytes;

    /// Widens the file header.
    fn file_header(raw: &Self::Ehdr, ident: Ident) -> FileHeader;
    /// Widens a section header.
    fn section_header(raw: &Self::Shdr, order: Endianness) -> SectionHeader;
    /// Widens a program header.
    fn program_header(raw: &Self::Phdr, order: Endianness) -> ProgramHeader;
    /// Widens a symbol.
    fn symbol(raw: &Self::Sym, order: Endianness) -> SymbolRecord;
    /// Widens a dynamic entry, sign-extending the tag.
    fn dynamic(raw: &Self::Dyn, order: Endianness) -> DynamicEntry;
    /// Widens a `REL` entry and splits its info word.
    fn rel(raw: &Self::Rel, order: Endianness) -> RelocationRecord;
    /// Widens a `RELA` entry and splits its info word.
    fn rela(raw: &Self::Rela, order: Endianness) -> RelocationRecord;
}

/// Marker for 32-bit ELF files.
#[derive(Debug)]
pub enum Elf32 {}

/// Marker for 64-bit ELF files.
#[derive(Debug)]
pub enum Elf64 {}

impl ElfClass for Elf32 {
    const CLASS: Class = Class::Elf32;

    type Ehdr = raw::Elf32Ehdr;
    type Shdr = raw::Elf32Shdr;
    type Phdr = raw::Elf32Phdr;
    type Sym = raw::Elf32Sym;
    type Dyn = raw::Elf32Dyn;
    type Rel = raw::Elf32Rel;
    type Rela = raw::Elf32Rela;

    fn file_header(raw: &Self::Ehdr, ident: Ident) -> FileHeader {
        let o = ident.endianness;
        FileHeader {
            ident,
            e_type: ObjectType::from_raw(raw.e_type.get(o)),
            e_machine: Machine::from_raw(raw.e_machine.get(o)),
            e_version: raw.e_version.get(o),
            e_entry: u64::from(raw.e_entry.get(o)),
            e_phoff: u64::from(raw.e_phoff.get(o)),
            e_shoff: u64::from(raw.e_shoff.get(o)),
            e_flags: raw.e_flags.get(o),
            e_ehsize: raw.e_ehsize.get(o),
            e_phentsize: raw.e_phentsize.get(o),
            e_phnum: raw.e_phnum.get(o),
            e_shentsize: raw.e_shentsize.get(o),
            e_shnum: raw.e_shnum.get(o),
            e_shstrndx: raw.e_shstrndx.get(o),
        }
    }

    fn section_header(raw: &Self::Shdr, o: Endianness) -> SectionHeader {
        SectionHeader {
            sh_name: raw.sh_name.get(o),
            sh_type: raw.sh_type.get(o),
            sh_flags: u64::from(raw.sh_flags.get(o)),
            sh_addr: u64::from(raw.sh_addr.get(o)),
            sh_offset: u64::from(raw.sh_offset.get(o)),
            sh_size: u64::from(raw.sh_size.get(o)),
            sh_link: raw.sh_link.get(o),
            sh_info: raw.sh_info.get(o),
            sh_addralign: u64::from(raw.sh_addralign.get(o)),
            sh_entsize: u64::from(raw.sh_entsize.get(o)),
        }
    }

    fn program_header(raw: &Self::Phdr, o: Endianness) -> ProgramHeader {
        ProgramHeader {
            p_type: raw.p_type.get(o),
            p_flags: raw.p_flags.get(o),
            p_offset: u64::from(raw.p_offset.get(o)),
            p_vaddr: u64::from(raw.p_vaddr.get(o)),
            p_paddr: u64::from(raw.p_paddr.get(o)),
            p_filesz: u64::from(raw.p_filesz.get(o)),
            p_memsz: u64::from(raw.p_memsz.get(o)),
            p_align: u64::from(raw.p_align.get(o)),
        }
    }

    fn symbol(raw: &Self::Sym, o: Endianness) -> SymbolRecord {
        SymbolRecord {
            st_name: raw.st_name.get(o),
            st_info: raw.st_info,
            st_other: raw.st_other,
            st_shndx: raw.st_shndx.get(o),
            st_value: u64::from(raw.st_value.get(o)),
            st_size: u64::from(raw.st_size.get(o)),
        }
    }

    fn dynamic(raw: &Self::Dyn, o: Endianness) -> DynamicEntry {
        DynamicEntry::new(i64::from(raw.d_tag.get(o)), u64::from(raw.d_un.d_val(o)))
    }

    fn rel(raw: &Self::Rel, o: Endianness) -> RelocationRecord {
        let info = raw.r_info.get(o);
        RelocationRecord {
            r_offset: u64::from(raw.r_offset.get(o)),
            r_info: u64::from(info),
            r_sym: bits::r32_sym(info),
            r_type: bits::r32_type(info),
            r_addend: None,
        }
    }

    fn rela(raw: &Self::Rela, o: Endianness) -> RelocationRecord {
        let info = raw.r_info.get(o);
        RelocationRecord {
            r_offset: u64::from(raw.r_offset.get(o)),
            r_info: u64::from(info),
            r_sym: bits::r32_sym(info),
            r_type: bits::r32_type(info),
            r_addend: Some(i64::from(raw.r_addend.get(o))),
        }
    }
}

impl ElfClass for Elf64 {
    const CLASS: Class = Class::Elf64;

    type Ehdr = raw::Elf64Ehdr;
    type Shdr = raw::Elf64Shdr;
    type Phdr = raw::Elf64Phdr;
    type Sym = raw::Elf64Sym;
    type Dyn = raw::Elf64Dyn;
    type Rel = raw::Elf64Rel;
    type Rela = raw::Elf64Rela;

    fn file_header(raw: &Self::Ehdr, ident: Ident) -> FileHeader {
        let o = ident.endianness;
        FileHeader {
            ident,
            e_type: ObjectType::from_raw(raw.e_type.get(o)),
            e_machine: Machine::from_raw(raw.e_machine.get(o)),
            e_version: raw.e_version.get(o),
            e_entry: raw.e_entry.get(o),
            e_phoff: raw.e_phoff.get(o),
            e_shoff: raw.e_shoff.get(o),
            e_flags: raw.e_flags.get(o),
            e_ehsize: raw.e_ehsize.get(o),
            e_phentsize: raw.e_phentsize.get(o),
            e_phnum: raw.e_phnum.get(o),
            e_shentsize: raw.e_shentsize.get(o),
            e_shnum: raw.e_shnum.get(o),
            e_shstrndx: raw.e_shstrndx.get(o),
        }
    }

    fn section_header(raw: &Self::Shdr, o: Endianness) -> SectionHeader {
        SectionHeader {
            sh_name: raw.sh_name.get(o),
            sh_type: raw.sh_type.get(o),
            sh_flags: raw.sh_flags.get(o),
            sh_addr: raw.sh_addr.get(o),
            sh_offset: raw.sh_offset.get(o),
            sh_size: raw.sh_size.get(o),
            sh_link: raw.sh_link.get(o),
            sh_info: raw.sh_info.get(o),
            sh_addralign: raw.sh_addralign.get(o),
            sh_entsize: raw.sh_entsize.get(o),
        }
    }

    fn program_header(raw: &Self::Phdr, o: Endianness) -> ProgramHeader {
        ProgramHeader {
            p_type: raw.p_type.get(o),
            p_flags: raw.p_flags.get(o),
            p_offset: raw.p_offset.get(o),
            p_vaddr: raw.p_vaddr.get(o),
            p_paddr: raw.p_paddr.get(o),
            p_filesz: raw.p_filesz.get(o),
            p_memsz: raw.p_memsz.get(o),
            p_align: raw.p_align.get(o),
        }
    }

    fn symbol(raw: &Self::Sym, o: Endianness) -> SymbolRecord {
        SymbolRecord {
            st_name: raw.st_name.get(o),
            st_info: raw.st_info,
            st_other: raw.st_other,
            st_shndx: raw.st_shndx.get(o),
            st_value: raw.st_value.get(o),
            st_size: raw.st_size.get(o),
        }
    }

    fn dynamic(raw: &Self::Dyn, o: Endianness) -> DynamicEntry {
        DynamicEntry::new(raw.d_tag.get(o), raw.d_un.d_val(o))
    }

    fn rel(raw: &Self::Rel, o: Endianness) -> RelocationRecord {
        let info = raw.r_info.get(o);
        RelocationRecord {
            r_offset: raw.r_offset.get(o),
            r_info: info,
            r_sym: bits::r64_sym(info),
            r_type: bits::r64_type(info),
            r_addend: None,
        }
    }

    fn rela(raw: &Self::Rela, o: Endianness) -> RelocationRecord {
        let info = raw.r_info.get(o);
        RelocationRecord {
            r_offset: raw.r_offset.get(o),
            r_info: info,
            r_sym: bits::r64_sym(info),
            r_type: bits::r64_type(info),
            r_addend: Some(raw.r_addend.get(o)),
        }
    }
}

#[cfg(test)]
mod tests {
    use kestrel_binparse::{I32, U32, U64};

    use super::*;
    use crate::raw::{Elf32Dyn, Elf32DynUnion, Elf32Rela, Elf64Rela};
    use crate::types::DynamicTag;

    #[test]
    fn elf32_dynamic_tag_is_sign_extended() {
        let o = Endianness::Big;
        let raw = Elf32Dyn {
            d_tag: I32::new(0x7fff_ffff, o),
            d_un: Elf32DynUnion {
                raw: U32::new(7, o),
            },
        };
        let entry = Elf32::dynamic(&raw, o);
        assert_eq!(entry.tag, DynamicTag::Filter);
        assert_eq!(entry.d_val(), 7);

        let negative = Elf32Dyn {
            d_tag: I32::new(-1, o),
            ..raw
        };
        assert_eq!(Elf32::dynamic(&negative, o).d_tag(), -1);
    }

    #[test]
    fn rela_info_split_per_class() {
        let o = Endianness::Little;
        let r32 = Elf32Rela {
            r_offset: U32::new(0x1000, o),
            r_info: U32::new(bits::r32_info(5, 7), o),
            r_addend: I32::new(-4, o),
        };
        let rec = Elf32::rela(&r32, o);
        assert_eq!((rec.r_sym, rec.r_type, rec.r_addend), (5, 7, Some(-4)));

        let r64 = Elf64Rela {
            r_offset: U64::new(0x1000, o),
            r_info: U64::new(bits::r64_info(0x1_0000, 0x25), o),
            r_addend: kestrel_binparse::I64::new(8, o),
        };
        let rec = Elf64::rela(&r64, o);
        assert_eq!((rec.r_sym, rec.r_type, rec.r_addend), (0x1_0000, 0x25, Some(8)));
    }
}
