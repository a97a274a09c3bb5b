//! Named ELF constants.
//!
//! Enumerated fields are modelled as open enums: every known value has a
//! variant, and anything else is kept verbatim in `Unknown` so that
//! decoding never fails on a value this crate has not heard of. Flag words
//! are `bitflags` types that retain unknown bits.

use core::fmt;

macro_rules! open_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident: $raw:ty {
            $($variant:ident = $value:literal => $label:literal,)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $(
                #[doc = concat!("`", $label, "`.")]
                $variant,
            )*
            /// A value with no known name.
            Unknown($raw),
        }

        impl $name {
            /// Maps a raw field value to its variant.
            #[must_use]
            pub const fn from_raw(raw: $raw) -> Self {
                match raw {
                    $($value => Self::$variant,)*
                    other => Self::Unknown(other),
                }
            }

            /// Returns the raw field value.
            #[must_use]
            pub const fn raw(self) -> $raw {
                match self {
                    $(Self::$variant => $value,)*
                    Self::Unknown(other) => other,
                }
            }

            /// Returns the ABI constant name, or `None` for unknown values.
            #[must_use]
            pub const fn name(self) -> Option<&'static str> {
                match self {
                    $(Self::$variant => Some($label),)*
                    Self::Unknown(_) => None,
                }
            }
        }

        impl From<$raw> for $name {
            fn from(raw: $raw) -> Self {
                Self::from_raw(raw)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self.name() {
                    Some(name) => f.write_str(name),
                    None => write!(f, "{}({:#x})", stringify!($name), self.raw()),
                }
            }
        }
    };
}

open_enum! {
    /// Object file type (`e_type`).
    pub enum ObjectType: u16 {
        None = 0 => "ET_NONE",
        Relocatable = 1 => "ET_REL",
        Executable = 2 => "ET_EXEC",
        SharedObject = 3 => "ET_DYN",
        Core = 4 => "ET_CORE",
    }
}

open_enum! {
    /// Target architecture (`e_machine`).
    pub enum Machine: u16 {
        None = 0 => "EM_NONE",
        M32 = 1 => "EM_M32",
        Sparc = 2 => "EM_SPARC",
        I386 = 3 => "EM_386",
        M68k = 4 => "EM_68K",
        M88k = 5 => "EM_88K",
        Iamcu = 6 => "EM_IAMCU",
        I860 = 7 => "EM_860",
        Mips = 8 => "EM_MIPS",
        S370 = 9 => "EM_S370",
        MipsRs3Le = 10 => "EM_MIPS_RS3_LE",
        Parisc = 15 => "EM_PARISC",
        Vpp500 = 17 => "EM_VPP500",
        Sparc32Plus = 18 => "EM_SPARC32PLUS",
        I960 = 19 => "EM_960",
        Ppc = 20 => "EM_PPC",
        Ppc64 = 21 => "EM_PPC64",
        S390 = 22 => "EM_S390",
        Spu = 23 => "EM_SPU",
        V800 = 36 => "EM_V800",
        Fr20 = 37 => "EM_FR20",
        Rh32 = 38 => "EM_RH32",
        Rce = 39 => "EM_RCE",
        Arm = 40 => "EM_ARM",
        FakeAlpha = 41 => "EM_FAKE_ALPHA",
        Sh = 42 => "EM_SH",
        SparcV9 = 43 => "EM_SPARCV9",
        Tricore = 44 => "EM_TRICORE",
        Arc = 45 => "EM_ARC",
        H8_300 = 46 => "EM_H8_300",
        Ia64 = 50 => "EM_IA_64",
        MipsX = 51 => "EM_MIPS_X",
        Coldfire = 52 => "EM_COLDFIRE",
        M68hc12 = 53 => "EM_68HC12",
        X86_64 = 62 => "EM_X86_64",
        Avr = 83 => "EM_AVR",
        Fr30 = 84 => "EM_FR30",
        V850 = 87 => "EM_V850",
        M32r = 88 => "EM_M32R",
        Mn10300 = 89 => "EM_MN10300",
        OpenRisc = 92 => "EM_OPENRISC",
        ArcCompact = 93 => "EM_ARC_COMPACT",
        Xtensa = 94 => "EM_XTENSA",
        Nios2 = 113 => "EM_ALTERA_NIOS2",
        AArch64 = 183 => "EM_AARCH64",
        TilePro = 188 => "EM_TILEPRO",
        MicroBlaze = 189 => "EM_MICROBLAZE",
        TileGx = 191 => "EM_TILEGX",
        ArcCompact2 = 195 => "EM_ARCV2",
        AmdGpu = 224 => "EM_AMDGPU",
        RiscV = 243 => "EM_RISCV",
        Bpf = 247 => "EM_BPF",
        Csky = 252 => "EM_CSKY",
        LoongArch = 258 => "EM_LOONGARCH",
        Alpha = 0x9026 => "EM_ALPHA",
        S390Old = 0xa390 => "EM_S390_OLD",
    }
}

open_enum! {
    /// Operating system ABI (`EI_OSABI`).
    pub enum OsAbi: u8 {
        SysV = 0 => "ELFOSABI_SYSV",
        HpUx = 1 => "ELFOSABI_HPUX",
        NetBsd = 2 => "ELFOSABI_NETBSD",
        Linux = 3 => "ELFOSABI_GNU",
        Solaris = 6 => "ELFOSABI_SOLARIS",
        Aix = 7 => "ELFOSABI_AIX",
        Irix = 8 => "ELFOSABI_IRIX",
        FreeBsd = 9 => "ELFOSABI_FREEBSD",
        Tru64 = 10 => "ELFOSABI_TRU64",
        Modesto = 11 => "ELFOSABI_MODESTO",
        OpenBsd = 12 => "ELFOSABI_OPENBSD",
        ArmAeabi = 64 => "ELFOSABI_ARM_AEABI",
        Arm = 97 => "ELFOSABI_ARM",
        Standalone = 255 => "ELFOSABI_STANDALONE",
    }
}

open_enum! {
    /// Section type (`sh_type`).
    pub enum SectionType: u32 {
        Null = 0 => "SHT_NULL",
        ProgBits = 1 => "SHT_PROGBITS",
        SymTab = 2 => "SHT_SYMTAB",
        StrTab = 3 => "SHT_STRTAB",
        Rela = 4 => "SHT_RELA",
        Hash = 5 => "SHT_HASH",
        Dynamic = 6 => "SHT_DYNAMIC",
        Note = 7 => "SHT_NOTE",
        NoBits = 8 => "SHT_NOBITS",
        Rel = 9 => "SHT_REL",
        ShLib = 10 => "SHT_SHLIB",
        DynSym = 11 => "SHT_DYNSYM",
        InitArray = 14 => "SHT_INIT_ARRAY",
        FiniArray = 15 => "SHT_FINI_ARRAY",
        PreinitArray = 16 => "SHT_PREINIT_ARRAY",
        Group = 17 => "SHT_GROUP",
        SymTabShndx = 18 => "SHT_SYMTAB_SHNDX",
        Relr = 19 => "SHT_RELR",
        GnuAttributes = 0x6fff_fff5 => "SHT_GNU_ATTRIBUTES",
        GnuHash = 0x6fff_fff6 => "SHT_GNU_HASH",
        GnuLibList = 0x6fff_fff7 => "SHT_GNU_LIBLIST",
        Checksum = 0x6fff_fff8 => "SHT_CHECKSUM",
        SunwMove = 0x6fff_fffa => "SHT_SUNW_move",
        SunwComdat = 0x6fff_fffb => "SHT_SUNW_COMDAT",
        SunwSyminfo = 0x6fff_fffc => "SHT_SUNW_syminfo",
        GnuVerdef = 0x6fff_fffd => "SHT_GNU_verdef",
        GnuVerneed = 0x6fff_fffe => "SHT_GNU_verneed",
        GnuVersym = 0x6fff_ffff => "SHT_GNU_versym",
        MipsRegInfo = 0x7000_0006 => "SHT_MIPS_REGINFO",
        MipsOptions = 0x7000_000d => "SHT_MIPS_OPTIONS",
        MipsAbiFlags = 0x7000_002a => "SHT_MIPS_ABIFLAGS",
    }
}

open_enum! {
    /// Segment type (`p_type`).
    pub enum SegmentType: u32 {
        Null = 0 => "PT_NULL",
        Load = 1 => "PT_LOAD",
        Dynamic = 2 => "PT_DYNAMIC",
        Interp = 3 => "PT_INTERP",
        Note = 4 => "PT_NOTE",
        ShLib = 5 => "PT_SHLIB",
        Phdr = 6 => "PT_PHDR",
        Tls = 7 => "PT_TLS",
        GnuEhFrame = 0x6474_e550 => "PT_GNU_EH_FRAME",
        GnuStack = 0x6474_e551 => "PT_GNU_STACK",
        GnuRelro = 0x6474_e552 => "PT_GNU_RELRO",
        GnuProperty = 0x6474_e553 => "PT_GNU_PROPERTY",
        SunwBss = 0x6fff_fffa => "PT_SUNWBSS",
        SunwStack = 0x6fff_fffb => "PT_SUNWSTACK",
    }
}

open_enum! {
    /// Symbol binding (high nibble of `st_info`).
    pub enum SymbolBinding: u8 {
        Local = 0 => "STB_LOCAL",
        Global = 1 => "STB_GLOBAL",
        Weak = 2 => "STB_WEAK",
        GnuUnique = 10 => "STB_GNU_UNIQUE",
    }
}

open_enum! {
    /// Symbol type (low nibble of `st_info`).
    pub enum SymbolType: u8 {
        NoType = 0 => "STT_NOTYPE",
        Object = 1 => "STT_OBJECT",
        Func = 2 => "STT_FUNC",
        Section = 3 => "STT_SECTION",
        File = 4 => "STT_FILE",
        Common = 5 => "STT_COMMON",
        Tls = 6 => "STT_TLS",
        GnuIfunc = 10 => "STT_GNU_IFUNC",
    }
}

open_enum! {
    /// Symbol visibility (low two bits of `st_other`).
    pub enum SymbolVisibility: u8 {
        Default = 0 => "STV_DEFAULT",
        Internal = 1 => "STV_INTERNAL",
        Hidden = 2 => "STV_HIDDEN",
        Protected = 3 => "STV_PROTECTED",
    }
}

open_enum! {
    /// Dynamic entry tag (`d_tag`), sign-extended from 32-bit files.
    pub enum DynamicTag: i64 {
        Null = 0 => "DT_NULL",
        Needed = 1 => "DT_NEEDED",
        PltRelSz = 2 => "DT_PLTRELSZ",
        PltGot = 3 => "DT_PLTGOT",
        Hash = 4 => "DT_HASH",
        StrTab = 5 => "DT_STRTAB",
        SymTab = 6 => "DT_SYMTAB",
        Rela = 7 => "DT_RELA",
        RelaSz = 8 => "DT_RELASZ",
        RelaEnt = 9 => "DT_RELAENT",
        StrSz = 10 => "DT_STRSZ",
        SymEnt = 11 => "DT_SYMENT",
        Init = 12 => "DT_INIT",
        Fini = 13 => "DT_FINI",
        SoName = 14 => "DT_SONAME",
        RPath = 15 => "DT_RPATH",
        Symbolic = 16 => "DT_SYMBOLIC",
        Rel = 17 => "DT_REL",
        RelSz = 18 => "DT_RELSZ",
        RelEnt = 19 => "DT_RELENT",
        PltRel = 20 => "DT_PLTREL",
        Debug = 21 => "DT_DEBUG",
        TextRel = 22 => "DT_TEXTREL",
        JmpRel = 23 => "DT_JMPREL",
        BindNow = 24 => "DT_BIND_NOW",
        InitArray = 25 => "DT_INIT_ARRAY",
        FiniArray = 26 => "DT_FINI_ARRAY",
        InitArraySz = 27 => "DT_INIT_ARRAYSZ",
        FiniArraySz = 28 => "DT_FINI_ARRAYSZ",
        RunPath = 29 => "DT_RUNPATH",
        Flags = 30 => "DT_FLAGS",
        PreinitArray = 32 => "DT_PREINIT_ARRAY",
        PreinitArraySz = 33 => "DT_PREINIT_ARRAYSZ",
        SymTabShndx = 34 => "DT_SYMTAB_SHNDX",
        RelrSz = 35 => "DT_RELRSZ",
        Relr = 36 => "DT_RELR",
        RelrEnt = 37 => "DT_RELRENT",
        GnuPrelinked = 0x6fff_fdf5 => "DT_GNU_PRELINKED",
        GnuConflictSz = 0x6fff_fdf6 => "DT_GNU_CONFLICTSZ",
        GnuLibListSz = 0x6fff_fdf7 => "DT_GNU_LIBLISTSZ",
        Checksum = 0x6fff_fdf8 => "DT_CHECKSUM",
        PltPadSz = 0x6fff_fdf9 => "DT_PLTPADSZ",
        MoveEnt = 0x6fff_fdfa => "DT_MOVEENT",
        MoveSz = 0x6fff_fdfb => "DT_MOVESZ",
        SymInSz = 0x6fff_fdfe => "DT_SYMINSZ",
        SymInEnt = 0x6fff_fdff => "DT_SYMINENT",
        GnuHash = 0x6fff_fef5 => "DT_GNU_HASH",
        GnuConflict = 0x6fff_fef8 => "DT_GNU_CONFLICT",
        GnuLibList = 0x6fff_fef9 => "DT_GNU_LIBLIST",
        Config = 0x6fff_fefa => "DT_CONFIG",
        DepAudit = 0x6fff_fefb => "DT_DEPAUDIT",
        Audit = 0x6fff_fefc => "DT_AUDIT",
        PltPad = 0x6fff_fefd => "DT_PLTPAD",
        MoveTab = 0x6fff_fefe => "DT_MOVETAB",
        SymInfo = 0x6fff_feff => "DT_SYMINFO",
        VerSym = 0x6fff_fff0 => "DT_VERSYM",
        RelaCount = 0x6fff_fff9 => "DT_RELACOUNT",
        RelCount = 0x6fff_fffa => "DT_RELCOUNT",
        Flags1 = 0x6fff_fffb => "DT_FLAGS_1",
        VerDef = 0x6fff_fffc => "DT_VERDEF",
        VerDefNum = 0x6fff_fffd => "DT_VERDEFNUM",
        VerNeed = 0x6fff_fffe => "DT_VERNEED",
        VerNeedNum = 0x6fff_ffff => "DT_VERNEEDNUM",
        Auxiliary = 0x7fff_fffd => "DT_AUXILIARY",
        Filter = 0x7fff_ffff => "DT_FILTER",
    }
}

open_enum! {
    /// Note type (`n_type`) of the notes most commonly found in executables.
    pub enum NoteType: u32 {
        GnuAbiTag = 1 => "NT_GNU_ABI_TAG",
        GnuHwcap = 2 => "NT_GNU_HWCAP",
        GnuBuildId = 3 => "NT_GNU_BUILD_ID",
        GnuGoldVersion = 4 => "NT_GNU_GOLD_VERSION",
        GnuPropertyType0 = 5 => "NT_GNU_PROPERTY_TYPE_0",
    }
}

bitflags::bitflags! {
    /// Section attribute flags (`sh_flags`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SectionFlags: u64 {
        /// `SHF_WRITE`.
        const WRITE = 0x1;
        /// `SHF_ALLOC`.
        const ALLOC = 0x2;
        /// `SHF_EXECINSTR`.
        const EXECINSTR = 0x4;
        /// `SHF_MERGE`.
        const MERGE = 0x10;
        /// `SHF_STRINGS`.
        const STRINGS = 0x20;
        /// `SHF_INFO_LINK`.
        const INFO_LINK = 0x40;
        /// `SHF_LINK_ORDER`.
        const LINK_ORDER = 0x80;
        /// `SHF_OS_NONCONFORMING`.
        const OS_NONCONFORMING = 0x100;
        /// `SHF_GROUP`.
        const GROUP = 0x200;
        /// `SHF_TLS`.
        const TLS = 0x400;
        /// `SHF_COMPRESSED`.
        const COMPRESSED = 0x800;
        /// `SHF_GNU_RETAIN`.
        const GNU_RETAIN = 0x20_0000;
        /// `SHF_EXCLUDE`.
        const EXCLUDE = 0x8000_0000;
    }
}

bitflags::bitflags! {
    /// Segment permission flags (`p_flags`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SegmentFlags: u32 {
        /// `PF_X`.
        const X = 0x1;
        /// `PF_W`.
        const W = 0x2;
        /// `PF_R`.
        const R = 0x4;
    }
}

bitflags::bitflags! {
    /// State flags carried by `DT_FLAGS_1`.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct DynamicFlags1: u64 {
        /// `DF_1_NOW`.
        const NOW = 0x0000_0001;
        /// `DF_1_GLOBAL`.
        const GLOBAL = 0x0000_0002;
        /// `DF_1_GROUP`.
        const GROUP = 0x0000_0004;
        /// `DF_1_NODELETE`.
        const NODELETE = 0x0000_0008;
        /// `DF_1_LOADFLTR`.
        const LOADFLTR = 0x0000_0010;
        /// `DF_1_INITFIRST`.
        const INITFIRST = 0x0000_0020;
        /// `DF_1_NOOPEN`.
        const NOOPEN = 0x0000_0040;
        /// `DF_1_ORIGIN`.
        const ORIGIN = 0x0000_0080;
        /// `DF_1_DIRECT`.
        const DIRECT = 0x0000_0100;
        /// `DF_1_TRANS`.
        const TRANS = 0x0000_0200;
        /// `DF_1_INTERPOSE`.
        const INTERPOSE = 0x0000_0400;
        /// `DF_1_NODEFLIB`.
        const NODEFLIB = 0x0000_0800;
        /// `DF_1_NODUMP`.
        const NODUMP = 0x0000_1000;
        /// `DF_1_CONFALT`.
        const CONFALT = 0x0000_2000;
        /// `DF_1_ENDFILTEE`.
        const ENDFILTEE = 0x0000_4000;
        /// `DF_1_DISPRELDNE`.
        const DISPRELDNE = 0x0000_8000;
        /// `DF_1_DISPRELPND`.
        const DISPRELPND = 0x0001_0000;
        /// `DF_1_NODIRECT`.
        const NODIRECT = 0x0002_0000;
        /// `DF_1_IGNMULDEF`.
        const IGNMULDEF = 0x0004_0000;
        /// `DF_1_NOKSYMS`.
        const NOKSYMS = 0x0008_0000;
        /// `DF_1_NOHDR`.
        const NOHDR = 0x0010_0000;
        /// `DF_1_EDITED`.
        const EDITED = 0x0020_0000;
        /// `DF_1_NORELOC`.
        const NORELOC = 0x0040_0000;
        /// `DF_1_SYMINTPOSE`.
        const SYMINTPOSE = 0x0080_0000;
        /// `DF_1_GLOBAUDIT`.
        const GLOBAUDIT = 0x0100_0000;
        /// `DF_1_SINGLETON`.
        const SINGLETON = 0x0200_0000;
        /// `DF_1_STUB`.
        const STUB = 0x0400_0000;
        /// `DF_1_PIE`.
        const PIE = 0x0800_0000;
    }
}

/// Undefined section index (`SHN_UNDEF`).
pub const SHN_UNDEF: u16 = 0;
/// Escape value: the real index lives elsewhere (`SHN_XINDEX`).
pub const SHN_XINDEX: u16 = 0xffff;
/// Escape value for `e_phnum` (`PN_XNUM`).
pub const PN_XNUM: u16 = 0xffff;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_values_round_trip() {
        assert_eq!(ObjectType::from_raw(2), ObjectType::Executable);
        assert_eq!(ObjectType::Executable.raw(), 2);
        assert_eq!(Machine::from(62), Machine::X86_64);
        assert_eq!(SectionType::from_raw(0x6fff_fffe), SectionType::GnuVerneed);
        assert_eq!(DynamicTag::Flags1.raw(), 0x6fff_fffb);
    }

    #[test]
    fn unknown_values_are_retained() {
        let machine = Machine::from_raw(0x1234);
        assert_eq!(machine, Machine::Unknown(0x1234));
        assert_eq!(machine.raw(), 0x1234);
        assert_eq!(machine.name(), None);
        assert_eq!(machine.to_string(), "Machine(0x1234)");
    }

    #[test]
    fn display_uses_abi_names() {
        assert_eq!(SegmentType::Load.to_string(), "PT_LOAD");
        assert_eq!(DynamicTag::Needed.to_string(), "DT_NEEDED");
        assert_eq!(SymbolBinding::Weak.name(), Some("STB_WEAK"));
    }

    #[test]
    fn flags_keep_unknown_bits() {
        let flags = SectionFlags::from_bits_retain(0x6 | 0x1000_0000);
        assert!(flags.contains(SectionFlags::ALLOC | SectionFlags::EXECINSTR));
        assert_eq!(flags.bits(), 0x1000_0006);

        let seg = SegmentFlags::from_bits_retain(5);
        assert!(seg.contains(SegmentFlags::R | SegmentFlags::X));
        assert!(!seg.contains(SegmentFlags::W));
    }
}
