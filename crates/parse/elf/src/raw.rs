//! On-disk record structures.
//!
//! Each struct mirrors one ELF record byte-for-byte. Multi-byte fields are
//! byte-backed integers, so every record has alignment one and can be
//! overlaid anywhere in a buffer; values are decoded with an explicit
//! [`Endianness`]. Records whose 32- and 64-bit forms are identical are
//! shared between both classes.

#![allow(missing_docs, reason = "fields carry their ELF ABI names")]

use kestrel_binparse::{Endianness, FromBytes, I32, I64, U16, U32, U64};

/// The 16-byte `e_ident` block that opens every ELF file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes)]
#[repr(C)]
pub struct ElfIdent {
    pub ei_magic: [u8; 4],
    pub ei_class: u8,
    pub ei_data: u8,
    pub ei_version: u8,
    pub ei_osabi: u8,
    pub ei_abiversion: u8,
    pub ei_pad: [u8; 7],
}

/// `Elf32_Ehdr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes)]
#[repr(C)]
pub struct Elf32Ehdr {
    pub e_ident: ElfIdent,
    pub e_type: U16,
    pub e_machine: U16,
    pub e_version: U32,
    pub e_entry: U32,
    pub e_phoff: U32,
    pub e_shoff: U32,
    pub e_flags: U32,
    pub e_ehsize: U16,
    pub e_phentsize: U16,
    pub e_phnum: U16,
    pub e_shentsize: U16,
    pub e_shnum: U16,
    pub e_shstrndx: U16,
}

/// `Elf64_Ehdr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes)]
#[repr(C)]
pub struct Elf64Ehdr {
    pub e_ident: ElfIdent,
    pub e_type: U16,
    pub e_machine: U16,
    pub e_version: U32,
    pub e_entry: U64,
    pub e_phoff: U64,
    pub e_shoff: U64,
    pub e_flags: U32,
    pub e_ehsize: U16,
    pub e_phentsize: U16,
    pub e_phnum: U16,
    pub e_shentsize: U16,
    pub e_shnum: U16,
    pub e_shstrndx: U16,
}

/// `Elf32_Shdr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes)]
#[repr(C)]
pub struct Elf32Shdr {
    pub sh_name: U32,
    pub sh_type: U32,
    pub sh_flags: U32,
    pub sh_addr: U32,
    pub sh_offset: U32,
    pub sh_size: U32,
    pub sh_link: U32,
    pub sh_info: U32,
    pub sh_addralign: U32,
    pub sh_entsize: U32,
}

/// `Elf64_Shdr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes)]
#[repr(C)]
pub struct Elf64Shdr {
    pub sh_name: U32,
    pub sh_type: U32,
    pub sh_flags: U64,
    pub sh_addr: U64,
    pub sh_offset: U64,
    pub sh_size: U64,
    pub sh_link: U32,
    pub sh_info: U32,
    pub sh_addralign: U64,
    pub sh_entsize: U64,
}

/// `Elf32_Phdr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes)]
#[repr(C)]
pub struct Elf32Phdr {
    pub p_type: U32,
    pub p_offset: U32,
    pub p_vaddr: U32,
    pub p_paddr: U32,
    pub p_filesz: U32,
    pub p_memsz: U32,
    pub p_flags: U32,
    pub p_align: U32,
}

/// `Elf64_Phdr`. Note that `p_flags` moves up to second place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes)]
#[repr(C)]
pub struct Elf64Phdr {
    pub p_type: U32,
    pub p_flags: U32,
    pub p_offset: U64,
    pub p_vaddr: U64,
    pub p_paddr: U64,
    pub p_filesz: U64,
    pub p_memsz: U64,
    pub p_align: U64,
}

/// `Elf32_Sym`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes)]
#[repr(C)]
pub struct Elf32Sym {
    pub st_name: U32,
    pub st_value: U32,
    pub st_size: U32,
    pub st_info: u8,
    pub st_other: u8,
    pub st_shndx: U16,
}

/// `Elf64_Sym`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes)]
#[repr(C)]
pub struct Elf64Sym {
    pub st_name: U32,
    pub st_info: u8,
    pub st_other: u8,
    pub st_shndx: U16,
    pub st_value: U64,
    pub st_size: U64,
}

/// `Elf32_Syminfo` / `Elf64_Syminfo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes)]
#[repr(C)]
pub struct ElfSyminfo {
    pub si_boundto: U16,
    pub si_flags: U16,
}

/// `Elf32_Rel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes)]
#[repr(C)]
pub struct Elf32Rel {
    pub r_offset: U32,
    pub r_info: U32,
}

/// `Elf64_Rel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes)]
#[repr(C)]
pub struct Elf64Rel {
    pub r_offset: U64,
    pub r_info: U64,
}

/// `Elf32_Rela`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes)]
#[repr(C)]
pub struct Elf32Rela {
    pub r_offset: U32,
    pub r_info: U32,
    pub r_addend: I32,
}

/// `Elf64_Rela`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes)]
#[repr(C)]
pub struct Elf64Rela {
    pub r_offset: U64,
    pub r_info: U64,
    pub r_addend: I64,
}

macro_rules! word_union {
    ($(#[$meta:meta])* $name:ident, $word:ident, $prim:ty, $first:ident, $second:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes)]
        #[repr(C)]
        pub struct $name {
            pub raw: $word,
        }

        impl $name {
            #[doc = concat!("Reads the union as `", stringify!($first), "`.")]
            #[must_use]
            pub fn $first(self, order: Endianness) -> $prim {
                self.raw.get(order)
            }

            #[doc = concat!("Reads the union as `", stringify!($second), "`.")]
            #[must_use]
            pub fn $second(self, order: Endianness) -> $prim {
                self.raw.get(order)
            }
        }
    };
}

word_union!(
    /// The `d_un` union of `Elf32_Dyn`.
    Elf32DynUnion, U32, u32, d_val, d_ptr
);
word_union!(
    /// The `d_un` union of `Elf64_Dyn`.
    Elf64DynUnion, U64, u64, d_val, d_ptr
);
word_union!(
    /// The `a_un` union of `Elf32_auxv_t`.
    Elf32AuxvUnion, U32, u32, a_val, a_ptr
);
word_union!(
    /// The `a_un` union of `Elf64_auxv_t`.
    Elf64AuxvUnion, U64, u64, a_val, a_ptr
);

/// `Elf32_Dyn`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes)]
#[repr(C)]
pub struct Elf32Dyn {
    pub d_tag: I32,
    pub d_un: Elf32DynUnion,
}

/// `Elf64_Dyn`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes)]
#[repr(C)]
pub struct Elf64Dyn {
    pub d_tag: I64,
    pub d_un: Elf64DynUnion,
}

/// `Elf32_Move`. The 32-bit ABIs align `m_value` to four bytes, so the
/// record is 20 bytes with no trailing padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes)]
#[repr(C)]
pub struct Elf32Move {
    pub m_value: U64,
    pub m_info: U32,
    pub m_poffset: U32,
    pub m_repeat: U16,
    pub m_stride: U16,
}

/// `Elf64_Move`, including the four bytes of tail padding the 64-bit ABIs
/// place after `m_stride`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes)]
#[repr(C)]
pub struct Elf64Move {
    pub m_value: U64,
    pub m_info: U64,
    pub m_poffset: U64,
    pub m_repeat: U16,
    pub m_stride: U16,
    pub m_pad: [u8; 4],
}

/// `Elf32_Lib` / `Elf64_Lib`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes)]
#[repr(C)]
pub struct ElfLib {
    pub l_name: U32,
    pub l_time_stamp: U32,
    pub l_checksum: U32,
    pub l_version: U32,
    pub l_flags: U32,
}

/// `Elf32_Verdef` / `Elf64_Verdef`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes)]
#[repr(C)]
pub struct ElfVerdef {
    pub vd_version: U16,
    pub vd_flags: U16,
    pub vd_ndx: U16,
    pub vd_cnt: U16,
    pub vd_hash: U32,
    pub vd_aux: U32,
    pub vd_next: U32,
}

/// `Elf32_Verdaux` / `Elf64_Verdaux`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes)]
#[repr(C)]
pub struct ElfVerdaux {
    pub vda_name: U32,
    pub vda_next: U32,
}

/// `Elf32_Verneed` / `Elf64_Verneed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes)]
#[repr(C)]
pub struct ElfVerneed {
    pub vn_version: U16,
    pub vn_cnt: U16,
    pub vn_file: U32,
    pub vn_aux: U32,
    pub vn_next: U32,
}

/// `Elf32_Vernaux` / `Elf64_Vernaux`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes)]
#[repr(C)]
pub struct ElfVernaux {
    pub vna_hash: U32,
    pub vna_flags: U16,
    pub vna_other: U16,
    pub vna_name: U32,
    pub vna_next: U32,
}

/// `Elf32_auxv_t`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes)]
#[repr(C)]
pub struct Elf32Auxv {
    pub a_type: U32,
    pub a_un: Elf32AuxvUnion,
}

/// `Elf64_auxv_t`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes)]
#[repr(C)]
pub struct Elf64Auxv {
    pub a_type: U64,
    pub a_un: Elf64AuxvUnion,
}

/// `Elf32_Nhdr` / `Elf64_Nhdr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes)]
#[repr(C)]
pub struct ElfNhdr {
    pub n_namesz: U32,
    pub n_descsz: U32,
    pub n_type: U32,
}

/// `Elf32_RegInfo` from MIPS `.reginfo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes)]
#[repr(C)]
pub struct Elf32RegInfo {
    pub ri_gprmask: U32,
    pub ri_cprmask: [U32; 4],
    pub ri_gp_value: I32,
}

/// `Elf64_RegInfo` from MIPS `.MIPS.options`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes)]
#[repr(C)]
pub struct Elf64RegInfo {
    pub ri_gprmask: U32,
    pub ri_pad: U32,
    pub ri_cprmask: [U32; 4],
    pub ri_gp_value: I64,
}

/// `Elf_MIPS_ABIFlags_v0` from MIPS `.MIPS.abiflags`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes)]
#[repr(C)]
pub struct MipsAbiFlags {
    pub version: U16,
    pub isa_level: u8,
    pub isa_rev: u8,
    pub gpr_size: u8,
    pub cpr1_size: u8,
    pub cpr2_size: u8,
    pub fp_abi: u8,
    pub isa_ext: U32,
    pub ases: U32,
    pub flags1: U32,
    pub flags2: U32,
}

/// `Elf_Options`, the header of each MIPS option descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes)]
#[repr(C)]
pub struct ElfOptions {
    pub kind: u8,
    pub size: u8,
    pub section: U16,
    pub info: U32,
}
