//! Record layout registry.
//!
//! Describes every ELF record as an ordered list of named fields, for both
//! word sizes. The descriptions drive a generic, reflective decoder
//! ([`Layout::decode`]) that turns raw bytes into named values without a
//! dedicated struct, which is what tooling that wants to dump arbitrary
//! records needs. The typed structs in [`raw`](crate::raw) are the fast
//! path; each one has a layout here of exactly the same size.
//!
//! The registry is a reflective view only. [`Session`](crate::Session)
//! decodes through the typed records of [`ElfClass`](crate::ElfClass) and
//! merely reports the bound set through [`Session::layouts`](crate::Session::layouts).

use core::fmt;

use kestrel_binparse::{Endianness, FromBytes, I32, I64, U16, U32, U64};

use crate::error::ElfError;
use crate::ident::Class;

/// A primitive field encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prim {
    /// `unsigned char`.
    U8,
    /// `Elf_Half`.
    U16,
    /// `Elf32_Word` / `Elf32_Addr` / `Elf32_Off`.
    U32,
    /// `Elf64_Xword` / `Elf64_Addr` / `Elf64_Off`.
    U64,
    /// `Elf32_Sword`.
    I32,
    /// `Elf64_Sxword`.
    I64,
}

impl Prim {
    /// Encoded width in bytes.
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 => 2,
            Self::U32 | Self::I32 => 4,
            Self::U64 | Self::I64 => 8,
        }
    }

    fn decode(self, bytes: &[u8], offset: usize, order: Endianness) -> Option<Value> {
        Some(match self {
            Self::U8 => Value::Unsigned(u64::from(*bytes.get(offset)?)),
            Self::U16 => Value::Unsigned(u64::from(U16::read_at(bytes, offset)?.get(order))),
            Self::U32 => Value::Unsigned(u64::from(U32::read_at(bytes, offset)?.get(order))),
            Self::U64 => Value::Unsigned(U64::read_at(bytes, offset)?.get(order)),
            Self::I32 => Value::Signed(i64::from(I32::read_at(bytes, offset)?.get(order))),
            Self::I64 => Value::Signed(I64::read_at(bytes, offset)?.get(order)),
        })
    }
}

/// The shape of one field.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// A single integer.
    Scalar(Prim),
    /// Raw bytes that are never byte-swapped (magic numbers, padding).
    Bytes(usize),
    /// A fixed-length array of integers.
    Array(Prim, usize),
    /// A nested record.
    Struct(&'static Layout),
    /// Alternative interpretations of the same bytes. The union is as wide
    /// as its widest member.
    Union(&'static [Field]),
}

impl FieldKind {
    /// Encoded width in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        match *self {
            Self::Scalar(prim) => prim.size(),
            Self::Bytes(len) => len,
            Self::Array(prim, len) => prim.size() * len,
            Self::Struct(layout) => layout.size(),
            Self::Union(members) => members.iter().map(|m| m.kind.size()).max().unwrap_or(0),
        }
    }

    fn decode(&self, bytes: &[u8], offset: usize, order: Endianness) -> Option<Value> {
        match *self {
            Self::Scalar(prim) => prim.decode(bytes, offset, order),
            Self::Bytes(len) => {
                let end = offset.checked_add(len)?;
                Some(Value::Bytes(bytes.get(offset..end)?.to_vec()))
            }
            Self::Array(prim, len) => (0..len)
                .map(|i| prim.decode(bytes, offset + i * prim.size(), order))
                .collect::<Option<Vec<_>>>()
                .map(Value::Array),
            Self::Struct(layout) => layout.decode_at(bytes, offset, order).map(Value::Struct),
            Self::Union(members) => members
                .iter()
                .map(|m| {
                    Some(NamedValue {
                        name: m.name,
                        value: m.kind.decode(bytes, offset, order)?,
                    })
                })
                .collect::<Option<Vec<_>>>()
                .map(Value::Union),
        }
    }
}

/// A named field within a [`Layout`].
#[derive(Debug, Clone, Copy)]
pub struct Field {
    /// The field's ABI name, e.g. `st_value`.
    pub name: &'static str,
    /// The field's shape.
    pub kind: FieldKind,
}

/// The ordered field list of one record type.
#[derive(Debug)]
pub struct Layout {
    /// The record's ABI name, e.g. `Elf64_Sym`.
    pub name: &'static str,
    /// Fields in file order.
    pub fields: &'static [Field],
}

impl Layout {
    /// Total encoded size: the sum of the field widths.
    #[must_use]
    pub fn size(&self) -> usize {
        self.fields.iter().map(|f| f.kind.size()).sum()
    }

    /// Looks up a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Byte offset of the named field from the start of the record.
    #[must_use]
    pub fn offset_of(&self, name: &str) -> Option<usize> {
        let mut offset = 0;
        for field in self.fields {
            if field.name == name {
                return Some(offset);
            }
            offset += field.kind.size();
        }
        None
    }

    /// Decodes one record from the start of `bytes`.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::TruncatedInput`] if `bytes` is shorter than the
    /// record.
    pub fn decode(&self, bytes: &[u8], order: Endianness) -> Result<Vec<NamedValue>, ElfError> {
        self.decode_at(bytes, 0, order)
            .ok_or(ElfError::TruncatedInput {
                what: self.name,
                offset: 0,
                len: self.size() as u64,
                available: bytes.len() as u64,
            })
    }

    fn decode_at(&self, bytes: &[u8], offset: usize, order: Endianness) -> Option<Vec<NamedValue>> {
        let mut cursor = offset;
        let mut values = Vec::with_capacity(self.fields.len());
        for field in self.fields {
            values.push(NamedValue {
                name: field.name,
                value: field.kind.decode(bytes, cursor, order)?,
            });
            cursor += field.kind.size();
        }
        Some(values)
    }
}

/// A decoded field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// An unsigned integer, widened.
    Unsigned(u64),
    /// A signed integer, sign-extended.
    Signed(i64),
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// Array elements in order.
    Array(Vec<Value>),
    /// A nested record.
    Struct(Vec<NamedValue>),
    /// Every member of a union, each decoded from the same bytes.
    Union(Vec<NamedValue>),
}

impl Value {
    /// Returns the value as an unsigned integer, if it is one.
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Self::Unsigned(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the value as a signed integer, if it is one.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Self::Signed(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsigned(v) => write!(f, "{v:#x}"),
            Self::Signed(v) => write!(f, "{v}"),
            Self::Bytes(bytes) => write!(f, "{bytes:02x?}"),
            Self::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Struct(fields) | Self::Union(fields) => {
                f.write_str("{ ")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", field.name, field.value)?;
                }
                f.write_str(" }")
            }
        }
    }
}

/// A field name paired with its decoded value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedValue {
    /// Field name.
    pub name: &'static str,
    /// Decoded value.
    pub value: Value,
}

/// Looks up a field by name in a decoded record.
#[must_use]
pub fn find<'a>(values: &'a [NamedValue], name: &str) -> Option<&'a Value> {
    values.iter().find(|v| v.name == name).map(|v| &v.value)
}

const HALF: FieldKind = FieldKind::Scalar(Prim::U16);
const WORD: FieldKind = FieldKind::Scalar(Prim::U32);
const SWORD: FieldKind = FieldKind::Scalar(Prim::I32);
const XWORD: FieldKind = FieldKind::Scalar(Prim::U64);
const SXWORD: FieldKind = FieldKind::Scalar(Prim::I64);
const BYTE: FieldKind = FieldKind::Scalar(Prim::U8);

macro_rules! layout {
    ($(#[$meta:meta])* $ident:ident = $name:literal { $($field:ident: $kind:expr),* $(,)? }) => {
        #[doc = concat!("Layout of `", $name, "`.")]
        $(#[$meta])*
        pub static $ident: Layout = Layout {
            name: $name,
            fields: &[$(Field { name: stringify!($field), kind: $kind }),*],
        };
    };
}

layout!(
    /// The identification block.
    ELF_IDENT = "e_ident" {
        ei_magic: FieldKind::Bytes(4),
        ei_class: BYTE,
        ei_data: BYTE,
        ei_version: BYTE,
        ei_osabi: BYTE,
        ei_abiversion: BYTE,
        ei_pad: FieldKind::Bytes(7),
    }
);

layout!(
    ELF32_EHDR = "Elf32_Ehdr" {
        e_ident: FieldKind::Struct(&ELF_IDENT),
        e_type: HALF,
        e_machine: HALF,
        e_version: WORD,
        e_entry: WORD,
        e_phoff: WORD,
        e_shoff: WORD,
        e_flags: WORD,
        e_ehsize: HALF,
        e_phentsize: HALF,
        e_phnum: HALF,
        e_shentsize: HALF,
        e_shnum: HALF,
        e_shstrndx: HALF,
    }
);

layout!(
    ELF64_EHDR = "Elf64_Ehdr" {
        e_ident: FieldKind::Struct(&ELF_IDENT),
        e_type: HALF,
        e_machine: HALF,
        e_version: WORD,
        e_entry: XWORD,
        e_phoff: XWORD,
        e_shoff: XWORD,
        e_flags: WORD,
        e_ehsize: HALF,
        e_phentsize: HALF,
        e_phnum: HALF,
        e_shentsize: HALF,
        e_shnum: HALF,
        e_shstrndx: HALF,
    }
);

layout!(
    ELF32_SHDR = "Elf32_Shdr" {
        sh_name: WORD,
        sh_type: WORD,
        sh_flags: WORD,
        sh_addr: WORD,
        sh_offset: WORD,
        sh_size: WORD,
        sh_link: WORD,
        sh_info: WORD,
        sh_addralign: WORD,
        sh_entsize: WORD,
    }
);

layout!(
    ELF64_SHDR = "Elf64_Shdr" {
        sh_name: WORD,
        sh_type: WORD,
        sh_flags: XWORD,
        sh_addr: XWORD,
        sh_offset: XWORD,
        sh_size: XWORD,
        sh_link: WORD,
        sh_info: WORD,
        sh_addralign: XWORD,
        sh_entsize: XWORD,
    }
);

layout!(
    ELF32_PHDR = "Elf32_Phdr" {
        p_type: WORD,
        p_offset: WORD,
        p_vaddr: WORD,
        p_paddr: WORD,
        p_filesz: WORD,
        p_memsz: WORD,
        p_flags: WORD,
        p_align: WORD,
    }
);

layout!(
    ELF64_PHDR = "Elf64_Phdr" {
        p_type: WORD,
        p_flags: WORD,
        p_offset: XWORD,
        p_vaddr: XWORD,
        p_paddr: XWORD,
        p_filesz: XWORD,
        p_memsz: XWORD,
        p_align: XWORD,
    }
);

layout!(
    ELF32_SYM = "Elf32_Sym" {
        st_name: WORD,
        st_value: WORD,
        st_size: WORD,
        st_info: BYTE,
        st_other: BYTE,
        st_shndx: HALF,
    }
);

layout!(
    ELF64_SYM = "Elf64_Sym" {
        st_name: WORD,
        st_info: BYTE,
        st_other: BYTE,
        st_shndx: HALF,
        st_value: XWORD,
        st_size: XWORD,
    }
);

layout!(
    ELF32_SYMINFO = "Elf32_Syminfo" {
        si_boundto: HALF,
        si_flags: HALF,
    }
);

layout!(
    ELF64_SYMINFO = "Elf64_Syminfo" {
        si_boundto: HALF,
        si_flags: HALF,
    }
);

layout!(
    ELF32_REL = "Elf32_Rel" {
        r_offset: WORD,
        r_info: WORD,
    }
);

layout!(
    ELF64_REL = "Elf64_Rel" {
        r_offset: XWORD,
        r_info: XWORD,
    }
);

layout!(
    ELF32_RELA = "Elf32_Rela" {
        r_offset: WORD,
        r_info: WORD,
        r_addend: SWORD,
    }
);

layout!(
    ELF64_RELA = "Elf64_Rela" {
        r_offset: XWORD,
        r_info: XWORD,
        r_addend: SXWORD,
    }
);

layout!(
    ELF32_DYN = "Elf32_Dyn" {
        d_tag: SWORD,
        d_un: FieldKind::Union(&[
            Field { name: "d_val", kind: WORD },
            Field { name: "d_ptr", kind: WORD },
        ]),
    }
);

layout!(
    ELF64_DYN = "Elf64_Dyn" {
        d_tag: SXWORD,
        d_un: FieldKind::Union(&[
            Field { name: "d_val", kind: XWORD },
            Field { name: "d_ptr", kind: XWORD },
        ]),
    }
);

layout!(
    ELF32_MOVE = "Elf32_Move" {
        m_value: XWORD,
        m_info: WORD,
        m_poffset: WORD,
        m_repeat: HALF,
        m_stride: HALF,
    }
);

layout!(
    ELF64_MOVE = "Elf64_Move" {
        m_value: XWORD,
        m_info: XWORD,
        m_poffset: XWORD,
        m_repeat: HALF,
        m_stride: HALF,
        m_pad: FieldKind::Bytes(4),
    }
);

layout!(
    ELF32_LIB = "Elf32_Lib" {
        l_name: WORD,
        l_time_stamp: WORD,
        l_checksum: WORD,
        l_version: WORD,
        l_flags: WORD,
    }
);

layout!(
    ELF64_LIB = "Elf64_Lib" {
        l_name: WORD,
        l_time_stamp: WORD,
        l_checksum: WORD,
        l_version: WORD,
        l_flags: WORD,
    }
);

layout!(
    /// `Elf32_Verdef` and `Elf64_Verdef` share this layout.
    ELF_VERDEF = "Elf_Verdef" {
        vd_version: HALF,
        vd_flags: HALF,
        vd_ndx: HALF,
        vd_cnt: HALF,
        vd_hash: WORD,
        vd_aux: WORD,
        vd_next: WORD,
    }
);

layout!(
    /// `Elf32_Verdaux` and `Elf64_Verdaux` share this layout.
    ELF_VERDAUX = "Elf_Verdaux" {
        vda_name: WORD,
        vda_next: WORD,
    }
);

layout!(
    /// `Elf32_Verneed` and `Elf64_Verneed` share this layout.
    ELF_VERNEED = "Elf_Verneed" {
        vn_version: HALF,
        vn_cnt: HALF,
        vn_file: WORD,
        vn_aux: WORD,
        vn_next: WORD,
    }
);

layout!(
    /// `Elf32_Vernaux` and `Elf64_Vernaux` share this layout.
    ELF_VERNAUX = "Elf_Vernaux" {
        vna_hash: WORD,
        vna_flags: HALF,
        vna_other: HALF,
        vna_name: WORD,
        vna_next: WORD,
    }
);

layout!(
    ELF32_AUXV = "Elf32_auxv_t" {
        a_type: WORD,
        a_un: FieldKind::Union(&[Field { name: "a_val", kind: WORD }]),
    }
);

layout!(
    ELF64_AUXV = "Elf64_auxv_t" {
        a_type: XWORD,
        a_un: FieldKind::Union(&[Field { name: "a_val", kind: XWORD }]),
    }
);

layout!(
    /// `Elf32_Nhdr` and `Elf64_Nhdr` share this layout.
    ELF_NHDR = "Elf_Nhdr" {
        n_namesz: WORD,
        n_descsz: WORD,
        n_type: WORD,
    }
);

layout!(
    ELF32_REGINFO = "Elf32_RegInfo" {
        ri_gprmask: WORD,
        ri_cprmask: FieldKind::Array(Prim::U32, 4),
        ri_gp_value: SWORD,
    }
);

layout!(
    ELF64_REGINFO = "Elf64_RegInfo" {
        ri_gprmask: WORD,
        ri_pad: WORD,
        ri_cprmask: FieldKind::Array(Prim::U32, 4),
        ri_gp_value: SXWORD,
    }
);

layout!(
    /// MIPS ABI flags, identical for both classes.
    MIPS_ABIFLAGS = "Elf_MIPS_ABIFlags_v0" {
        version: HALF,
        isa_level: BYTE,
        isa_rev: BYTE,
        gpr_size: BYTE,
        cpr1_size: BYTE,
        cpr2_size: BYTE,
        fp_abi: BYTE,
        isa_ext: WORD,
        ases: WORD,
        flags1: WORD,
        flags2: WORD,
    }
);

layout!(
    /// MIPS option descriptor header, identical for both classes.
    ELF_OPTIONS = "Elf_Options" {
        kind: BYTE,
        size: BYTE,
        section: HALF,
        info: WORD,
    }
);

/// The full set of record layouts for one class and byte order.
#[derive(Debug, Clone, Copy)]
pub struct LayoutSet {
    /// Word size of this set.
    pub class: Class,
    /// Byte order the records are decoded in.
    pub endianness: Endianness,
    /// Identification block.
    pub ident: &'static Layout,
    /// File header.
    pub header: &'static Layout,
    /// Section header.
    pub section: &'static Layout,
    /// Program header.
    pub segment: &'static Layout,
    /// Symbol.
    pub symbol: &'static Layout,
    /// Symbol auxiliary info.
    pub syminfo: &'static Layout,
    /// Dynamic entry.
    pub dynamic: &'static Layout,
    /// Relocation without addend.
    pub rel: &'static Layout,
    /// Relocation with addend.
    pub rela: &'static Layout,
    /// Move record.
    pub move_record: &'static Layout,
    /// Prelink library-list entry.
    pub lib: &'static Layout,
    /// Version definition.
    pub verdef: &'static Layout,
    /// Version definition auxiliary.
    pub verdaux: &'static Layout,
    /// Version requirement.
    pub verneed: &'static Layout,
    /// Version requirement auxiliary.
    pub vernaux: &'static Layout,
    /// Auxiliary vector entry.
    pub auxv: &'static Layout,
    /// Note header.
    pub note: &'static Layout,
    /// MIPS register info.
    pub reginfo: &'static Layout,
    /// MIPS ABI flags.
    pub abiflags: &'static Layout,
    /// MIPS option descriptor.
    pub options: &'static Layout,
}

impl LayoutSet {
    /// Iterates over every layout in the set.
    pub fn iter(&self) -> impl Iterator<Item = &'static Layout> {
        [
            self.ident,
            self.header,
            self.section,
            self.segment,
            self.symbol,
            self.syminfo,
            self.dynamic,
            self.rel,
            self.rela,
            self.move_record,
            self.lib,
            self.verdef,
            self.verdaux,
            self.verneed,
            self.vernaux,
            self.auxv,
            self.note,
            self.reginfo,
            self.abiflags,
            self.options,
        ]
        .into_iter()
    }

    /// Looks up a layout by its ABI name.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&'static Layout> {
        self.iter().find(|l| l.name == name)
    }
}

/// Returns the layouts for `class`, decoded in `endianness`.
#[must_use]
pub fn layouts_for(class: Class, endianness: Endianness) -> LayoutSet {
    let elf32 = LayoutSet {
        class,
        endianness,
        ident: &ELF_IDENT,
        header: &ELF32_EHDR,
        section: &ELF32_SHDR,
        segment: &ELF32_PHDR,
        symbol: &ELF32_SYM,
        syminfo: &ELF32_SYMINFO,
        dynamic: &ELF32_DYN,
        rel: &ELF32_REL,
        rela: &ELF32_RELA,
        move_record: &ELF32_MOVE,
        lib: &ELF32_LIB,
        verdef: &ELF_VERDEF,
        verdaux: &ELF_VERDAUX,
        verneed: &ELF_VERNEED,
        vernaux: &ELF_VERNAUX,
        auxv: &ELF32_AUXV,
        note: &ELF_NHDR,
        reginfo: &ELF32_REGINFO,
        abiflags: &MIPS_ABIFLAGS,
        options: &ELF_OPTIONS,
    };
    match class {
        Class::Elf32 => elf32,
        Class::Elf64 => LayoutSet {
            header: &ELF64_EHDR,
            section: &ELF64_SHDR,
            segment: &ELF64_PHDR,
            symbol: &ELF64_SYM,
            syminfo: &ELF64_SYMINFO,
            dynamic: &ELF64_DYN,
            rel: &ELF64_REL,
            rela: &ELF64_RELA,
            move_record: &ELF64_MOVE,
            lib: &ELF64_LIB,
            auxv: &ELF64_AUXV,
            reginfo: &ELF64_REGINFO,
            ..elf32
        },
    }
}

/// Returns the layouts for a word size given in bits.
///
/// # Errors
///
/// Returns [`ElfError::UnsupportedLayout`] for anything other than 32 or
/// 64.
pub fn layouts_for_bits(bits: u32, endianness: Endianness) -> Result<LayoutSet, ElfError> {
    match bits {
        32 => Ok(layouts_for(Class::Elf32, endianness)),
        64 => Ok(layouts_for(Class::Elf64, endianness)),
        _ => Err(ElfError::UnsupportedLayout { bits }),
    }
}
