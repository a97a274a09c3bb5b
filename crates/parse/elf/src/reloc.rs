//! Relocation entries and per-architecture relocation type tables.
//!
//! Every architecture numbers its relocation types independently, so a raw
//! `r_type` only has a name once the file's machine is known. The tables
//! here are static data covering the common types of each family; codes
//! outside them still decode and display as raw numbers.

use core::fmt;

use crate::types::Machine;

/// A relocation-type numbering family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelocationArch {
    /// `R_X86_64_*`.
    X86_64,
    /// `R_386_*`.
    I386,
    /// `R_ARM_*`.
    Arm,
    /// `R_AARCH64_*`.
    AArch64,
    /// `R_RISCV_*`.
    RiscV,
    /// `R_MIPS_*`.
    Mips,
    /// `R_PPC_*`.
    PowerPc,
    /// `R_PPC64_*`.
    PowerPc64,
    /// `R_SPARC_*`.
    Sparc,
    /// `R_390_*`.
    S390,
    /// `R_IA64_*`.
    Ia64,
    /// `R_ALPHA_*`.
    Alpha,
    /// `R_68K_*`.
    M68k,
    /// `R_PARISC_*`.
    Parisc,
    /// `R_SH_*`.
    Sh,
    /// `R_MICROBLAZE_*`.
    MicroBlaze,
    /// `R_NIOS2_*`.
    Nios2,
    /// `R_ARC_*`.
    Arc,
    /// `R_CKCORE_*`.
    Csky,
}

/// Dynamic-linker facts about one relocation family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchTraits {
    /// Conventional machine name.
    pub name: &'static str,
    /// Type code of the PLT jump-slot relocation.
    pub jump_slot: u32,
    /// Type code of the indirect-function relocation, if the family has one.
    pub irelative: Option<u32>,
    /// Whether the dynamic linker processes `SHT_REL` tables.
    pub uses_rel: bool,
    /// Whether the dynamic linker processes `SHT_RELA` tables.
    pub uses_rela: bool,
}

const fn rela_only(name: &'static str, jump_slot: u32, irelative: Option<u32>) -> ArchTraits {
    ArchTraits {
        name,
        jump_slot,
        irelative,
        uses_rel: false,
        uses_rela: true,
    }
}

impl RelocationArch {
    /// Returns the name of relocation type `code`, e.g. `R_X86_64_JUMP_SLOT`.
    #[must_use]
    pub fn type_name(self, code: u32) -> Option<&'static str> {
        let table = self.table();
        table
            .binary_search_by_key(&code, |&(c, _)| c)
            .ok()
            .map(|i| table[i].1)
    }

    /// Returns the code of the named relocation type.
    #[must_use]
    pub fn type_code(self, name: &str) -> Option<u32> {
        self.table().iter().find(|&&(_, n)| n == name).map(|&(c, _)| c)
    }

    /// Returns the dynamic-linker facts for this family.
    #[must_use]
    pub const fn traits(self) -> ArchTraits {
        match self {
            Self::X86_64 => rela_only("x86_64", 7, Some(37)),
            Self::I386 => ArchTraits {
                name: "i386",
                jump_slot: 7,
                irelative: Some(42),
                uses_rel: true,
                uses_rela: true,
            },
            Self::Arm => ArchTraits {
                name: "ARM",
                jump_slot: 22,
                irelative: Some(160),
                uses_rel: true,
                uses_rela: true,
            },
            Self::AArch64 => rela_only("aarch64", 1026, Some(1032)),
            Self::RiscV => rela_only("RISC-V", 5, Some(58)),
            Self::Mips => ArchTraits {
                name: "MIPS",
                jump_slot: 127,
                irelative: None,
                uses_rel: true,
                uses_rela: true,
            },
            Self::PowerPc => rela_only("powerpc", 21, Some(248)),
            Self::PowerPc64 => rela_only("powerpc64", 21, Some(248)),
            Self::Sparc => rela_only("sparc", 21, Some(250)),
            Self::S390 => rela_only("s390", 11, Some(61)),
            Self::Ia64 => rela_only("ia64", 0x81, None),
            Self::Alpha => rela_only("alpha", 26, None),
            Self::M68k => rela_only("m68k", 21, None),
            Self::Parisc => rela_only("hppa", 129, None),
            Self::Sh => rela_only("SH", 164, None),
            Self::MicroBlaze => rela_only("microblaze", 17, None),
            Self::Nios2 => rela_only("nios2", 39, None),
            Self::Arc => rela_only("arc", 55, None),
            Self::Csky => rela_only("csky", 12, None),
        }
    }

    fn table(self) -> &'static [(u32, &'static str)] {
        match self {
            Self::X86_64 => R_X86_64,
            Self::I386 => R_386,
            Self::Arm => R_ARM,
            Self::AArch64 => R_AARCH64,
            Self::RiscV => R_RISCV,
            Self::Mips => R_MIPS,
            Self::PowerPc => R_PPC,
            Self::PowerPc64 => R_PPC64,
            Self::Sparc => R_SPARC,
            Self::S390 => R_390,
            Self::Ia64 => R_IA64,
            Self::Alpha => R_ALPHA,
            Self::M68k => R_68K,
            Self::Parisc => R_PARISC,
            Self::Sh => R_SH,
            Self::MicroBlaze => R_MICROBLAZE,
            Self::Nios2 => R_NIOS2,
            Self::Arc => R_ARC,
            Self::Csky => R_CKCORE,
        }
    }
}

/// Returns the relocation family used by `machine`, if one is known.
#[must_use]
pub const fn relocation_arch_for_machine(machine: Machine) -> Option<RelocationArch> {
    Some(match machine {
        Machine::X86_64 => RelocationArch::X86_64,
        Machine::I386 | Machine::Iamcu => RelocationArch::I386,
        Machine::Arm => RelocationArch::Arm,
        Machine::AArch64 => RelocationArch::AArch64,
        Machine::RiscV => RelocationArch::RiscV,
        Machine::Mips | Machine::MipsRs3Le => RelocationArch::Mips,
        Machine::Ppc => RelocationArch::PowerPc,
        Machine::Ppc64 => RelocationArch::PowerPc64,
        Machine::Sparc | Machine::Sparc32Plus | Machine::SparcV9 => RelocationArch::Sparc,
        Machine::S390 | Machine::S390Old => RelocationArch::S390,
        Machine::Ia64 => RelocationArch::Ia64,
        Machine::Alpha => RelocationArch::Alpha,
        Machine::M68k => RelocationArch::M68k,
        Machine::Parisc => RelocationArch::Parisc,
        Machine::Sh => RelocationArch::Sh,
        Machine::MicroBlaze => RelocationArch::MicroBlaze,
        Machine::Nios2 => RelocationArch::Nios2,
        Machine::Arc | Machine::ArcCompact | Machine::ArcCompact2 => RelocationArch::Arc,
        Machine::Csky => RelocationArch::Csky,
        _ => return None,
    })
}

/// A relocation type code, tagged with the family it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RelocationType {
    /// Family the code is interpreted in, if the machine has one.
    pub arch: Option<RelocationArch>,
    /// Raw `r_type`.
    pub code: u32,
}

impl RelocationType {
    /// Returns the type's name, if the family and code are known.
    #[must_use]
    pub fn name(self) -> Option<&'static str> {
        self.arch.and_then(|arch| arch.type_name(self.code))
    }

    /// Returns `true` if this is the family's jump-slot relocation.
    #[must_use]
    pub fn is_jump_slot(self) -> bool {
        self.arch.is_some_and(|arch| arch.traits().jump_slot == self.code)
    }
}

impl fmt::Display for RelocationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "{}", self.code),
        }
    }
}

/// One decoded relocation entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relocation {
    /// Name of the `SHT_REL`/`SHT_RELA` section holding the entry.
    pub section: String,
    /// `r_offset`.
    pub offset: u64,
    /// `r_info`, widened.
    pub info: u64,
    /// Symbol table index packed in `r_info`.
    pub sym: u32,
    /// Relocation type packed in `r_info`.
    pub kind: RelocationType,
    /// `r_addend`; `None` for `SHT_REL` entries.
    pub addend: Option<i64>,
    /// Name of the referenced symbol. `None` for index 0 or when name
    /// resolution is disabled.
    pub symbol_name: Option<String>,
}

static R_X86_64: &[(u32, &str)] = &[
    (0, "R_X86_64_NONE"),
    (1, "R_X86_64_64"),
    (2, "R_X86_64_PC32"),
    (3, "R_X86_64_GOT32"),
    (4, "R_X86_64_PLT32"),
    (5, "R_X86_64_COPY"),
    (6, "R_X86_64_GLOB_DAT"),
    (7, "R_X86_64_JUMP_SLOT"),
    (8, "R_X86_64_RELATIVE"),
    (9, "R_X86_64_GOTPCREL"),
    (10, "R_X86_64_32"),
    (11, "R_X86_64_32S"),
    (12, "R_X86_64_16"),
    (13, "R_X86_64_PC16"),
    (14, "R_X86_64_8"),
    (15, "R_X86_64_PC8"),
    (16, "R_X86_64_DTPMOD64"),
    (17, "R_X86_64_DTPOFF64"),
    (18, "R_X86_64_TPOFF64"),
    (19, "R_X86_64_TLSGD"),
    (20, "R_X86_64_TLSLD"),
    (21, "R_X86_64_DTPOFF32"),
    (22, "R_X86_64_GOTTPOFF"),
    (23, "R_X86_64_TPOFF32"),
    (24, "R_X86_64_PC64"),
    (25, "R_X86_64_GOTOFF64"),
    (26, "R_X86_64_GOTPC32"),
    (27, "R_X86_64_GOT64"),
    (28, "R_X86_64_GOTPCREL64"),
    (29, "R_X86_64_GOTPC64"),
    (30, "R_X86_64_GOTPLT64"),
    (31, "R_X86_64_PLTOFF64"),
    (32, "R_X86_64_SIZE32"),
    (33, "R_X86_64_SIZE64"),
    (34, "R_X86_64_GOTPC32_TLSDESC"),
    (35, "R_X86_64_TLSDESC_CALL"),
    (36, "R_X86_64_TLSDESC"),
    (37, "R_X86_64_IRELATIVE"),
    (38, "R_X86_64_RELATIVE64"),
    (41, "R_X86_64_GOTPCRELX"),
    (42, "R_X86_64_REX_GOTPCRELX"),
];

static R_386: &[(u32, &str)] = &[
    (0, "R_386_NONE"),
    (1, "R_386_32"),
    (2, "R_386_PC32"),
    (3, "R_386_GOT32"),
    (4, "R_386_PLT32"),
    (5, "R_386_COPY"),
    (6, "R_386_GLOB_DAT"),
    (7, "R_386_JMP_SLOT"),
    (8, "R_386_RELATIVE"),
    (9, "R_386_GOTOFF"),
    (10, "R_386_GOTPC"),
    (11, "R_386_32PLT"),
    (14, "R_386_TLS_TPOFF"),
    (15, "R_386_TLS_IE"),
    (16, "R_386_TLS_GOTIE"),
    (17, "R_386_TLS_LE"),
    (18, "R_386_TLS_GD"),
    (19, "R_386_TLS_LDM"),
    (20, "R_386_16"),
    (21, "R_386_PC16"),
    (22, "R_386_8"),
    (23, "R_386_PC8"),
    (35, "R_386_TLS_DTPMOD32"),
    (36, "R_386_TLS_DTPOFF32"),
    (37, "R_386_TLS_TPOFF32"),
    (38, "R_386_SIZE32"),
    (39, "R_386_TLS_GOTDESC"),
    (40, "R_386_TLS_DESC_CALL"),
    (41, "R_386_TLS_DESC"),
    (42, "R_386_IRELATIVE"),
    (43, "R_386_GOT32X"),
];

static R_ARM: &[(u32, &str)] = &[
    (0, "R_ARM_NONE"),
    (1, "R_ARM_PC24"),
    (2, "R_ARM_ABS32"),
    (3, "R_ARM_REL32"),
    (10, "R_ARM_THM_CALL"),
    (17, "R_ARM_TLS_DTPMOD32"),
    (18, "R_ARM_TLS_DTPOFF32"),
    (19, "R_ARM_TLS_TPOFF32"),
    (20, "R_ARM_COPY"),
    (21, "R_ARM_GLOB_DAT"),
    (22, "R_ARM_JUMP_SLOT"),
    (23, "R_ARM_RELATIVE"),
    (28, "R_ARM_CALL"),
    (29, "R_ARM_JUMP24"),
    (160, "R_ARM_IRELATIVE"),
];

static R_AARCH64: &[(u32, &str)] = &[
    (0, "R_AARCH64_NONE"),
    (257, "R_AARCH64_ABS64"),
    (258, "R_AARCH64_ABS32"),
    (259, "R_AARCH64_ABS16"),
    (260, "R_AARCH64_PREL64"),
    (261, "R_AARCH64_PREL32"),
    (262, "R_AARCH64_PREL16"),
    (275, "R_AARCH64_ADR_PREL_PG_HI21"),
    (277, "R_AARCH64_ADD_ABS_LO12_NC"),
    (282, "R_AARCH64_JUMP26"),
    (283, "R_AARCH64_CALL26"),
    (286, "R_AARCH64_LDST64_ABS_LO12_NC"),
    (311, "R_AARCH64_ADR_GOT_PAGE"),
    (312, "R_AARCH64_LD64_GOT_LO12_NC"),
    (1024, "R_AARCH64_COPY"),
    (1025, "R_AARCH64_GLOB_DAT"),
    (1026, "R_AARCH64_JUMP_SLOT"),
    (1027, "R_AARCH64_RELATIVE"),
    (1028, "R_AARCH64_TLS_DTPMOD"),
    (1029, "R_AARCH64_TLS_DTPREL"),
    (1030, "R_AARCH64_TLS_TPREL"),
    (1031, "R_AARCH64_TLSDESC"),
    (1032, "R_AARCH64_IRELATIVE"),
];

static R_RISCV: &[(u32, &str)] = &[
    (0, "R_RISCV_NONE"),
    (1, "R_RISCV_32"),
    (2, "R_RISCV_64"),
    (3, "R_RISCV_RELATIVE"),
    (4, "R_RISCV_COPY"),
    (5, "R_RISCV_JUMP_SLOT"),
    (6, "R_RISCV_TLS_DTPMOD32"),
    (7, "R_RISCV_TLS_DTPMOD64"),
    (8, "R_RISCV_TLS_DTPREL32"),
    (9, "R_RISCV_TLS_DTPREL64"),
    (10, "R_RISCV_TLS_TPREL32"),
    (11, "R_RISCV_TLS_TPREL64"),
    (16, "R_RISCV_BRANCH"),
    (17, "R_RISCV_JAL"),
    (18, "R_RISCV_CALL"),
    (19, "R_RISCV_CALL_PLT"),
    (20, "R_RISCV_GOT_HI20"),
    (23, "R_RISCV_PCREL_HI20"),
    (24, "R_RISCV_PCREL_LO12_I"),
    (25, "R_RISCV_PCREL_LO12_S"),
    (26, "R_RISCV_HI20"),
    (27, "R_RISCV_LO12_I"),
    (28, "R_RISCV_LO12_S"),
    (51, "R_RISCV_RELAX"),
    (58, "R_RISCV_IRELATIVE"),
];

static R_MIPS: &[(u32, &str)] = &[
    (0, "R_MIPS_NONE"),
    (1, "R_MIPS_16"),
    (2, "R_MIPS_32"),
    (3, "R_MIPS_REL32"),
    (4, "R_MIPS_26"),
    (5, "R_MIPS_HI16"),
    (6, "R_MIPS_LO16"),
    (7, "R_MIPS_GPREL16"),
    (9, "R_MIPS_GOT16"),
    (10, "R_MIPS_PC16"),
    (11, "R_MIPS_CALL16"),
    (12, "R_MIPS_GPREL32"),
    (18, "R_MIPS_64"),
    (126, "R_MIPS_COPY"),
    (127, "R_MIPS_JUMP_SLOT"),
];

static R_PPC: &[(u32, &str)] = &[
    (0, "R_PPC_NONE"),
    (1, "R_PPC_ADDR32"),
    (10, "R_PPC_REL24"),
    (19, "R_PPC_COPY"),
    (20, "R_PPC_GLOB_DAT"),
    (21, "R_PPC_JMP_SLOT"),
    (22, "R_PPC_RELATIVE"),
    (26, "R_PPC_REL32"),
    (248, "R_PPC_IRELATIVE"),
];

static R_PPC64: &[(u32, &str)] = &[
    (0, "R_PPC64_NONE"),
    (1, "R_PPC64_ADDR32"),
    (10, "R_PPC64_REL24"),
    (19, "R_PPC64_COPY"),
    (20, "R_PPC64_GLOB_DAT"),
    (21, "R_PPC64_JMP_SLOT"),
    (22, "R_PPC64_RELATIVE"),
    (38, "R_PPC64_ADDR64"),
    (248, "R_PPC64_IRELATIVE"),
];

static R_SPARC: &[(u32, &str)] = &[
    (0, "R_SPARC_NONE"),
    (1, "R_SPARC_8"),
    (2, "R_SPARC_16"),
    (3, "R_SPARC_32"),
    (7, "R_SPARC_WDISP30"),
    (19, "R_SPARC_COPY"),
    (20, "R_SPARC_GLOB_DAT"),
    (21, "R_SPARC_JMP_SLOT"),
    (22, "R_SPARC_RELATIVE"),
    (32, "R_SPARC_64"),
    (249, "R_SPARC_JMP_IREL"),
    (250, "R_SPARC_IRELATIVE"),
];

static R_390: &[(u32, &str)] = &[
    (0, "R_390_NONE"),
    (4, "R_390_32"),
    (5, "R_390_PC32"),
    (9, "R_390_COPY"),
    (10, "R_390_GLOB_DAT"),
    (11, "R_390_JMP_SLOT"),
    (12, "R_390_RELATIVE"),
    (22, "R_390_64"),
    (61, "R_390_IRELATIVE"),
];

static R_IA64: &[(u32, &str)] = &[
    (0x00, "R_IA64_NONE"),
    (0x24, "R_IA64_DIR32MSB"),
    (0x25, "R_IA64_DIR32LSB"),
    (0x26, "R_IA64_DIR64MSB"),
    (0x27, "R_IA64_DIR64LSB"),
    (0x6c, "R_IA64_REL32MSB"),
    (0x6d, "R_IA64_REL32LSB"),
    (0x6e, "R_IA64_REL64MSB"),
    (0x6f, "R_IA64_REL64LSB"),
    (0x80, "R_IA64_IPLTMSB"),
    (0x81, "R_IA64_IPLTLSB"),
];

static R_ALPHA: &[(u32, &str)] = &[
    (0, "R_ALPHA_NONE"),
    (1, "R_ALPHA_REFLONG"),
    (2, "R_ALPHA_REFQUAD"),
    (24, "R_ALPHA_COPY"),
    (25, "R_ALPHA_GLOB_DAT"),
    (26, "R_ALPHA_JMP_SLOT"),
    (27, "R_ALPHA_RELATIVE"),
];

static R_68K: &[(u32, &str)] = &[
    (0, "R_68K_NONE"),
    (1, "R_68K_32"),
    (19, "R_68K_COPY"),
    (20, "R_68K_GLOB_DAT"),
    (21, "R_68K_JMP_SLOT"),
    (22, "R_68K_RELATIVE"),
];

static R_PARISC: &[(u32, &str)] = &[
    (0, "R_PARISC_NONE"),
    (1, "R_PARISC_DIR32"),
    (2, "R_PARISC_DIR21L"),
    (9, "R_PARISC_PCREL32"),
    (128, "R_PARISC_COPY"),
    (129, "R_PARISC_IPLT"),
    (130, "R_PARISC_EPLT"),
];

static R_SH: &[(u32, &str)] = &[
    (0, "R_SH_NONE"),
    (1, "R_SH_DIR32"),
    (2, "R_SH_REL32"),
    (162, "R_SH_COPY"),
    (163, "R_SH_GLOB_DAT"),
    (164, "R_SH_JMP_SLOT"),
    (165, "R_SH_RELATIVE"),
];

static R_MICROBLAZE: &[(u32, &str)] = &[
    (0, "R_MICROBLAZE_NONE"),
    (1, "R_MICROBLAZE_32"),
    (2, "R_MICROBLAZE_32_PCREL"),
    (16, "R_MICROBLAZE_REL"),
    (17, "R_MICROBLAZE_JUMP_SLOT"),
    (18, "R_MICROBLAZE_GLOB_DAT"),
    (21, "R_MICROBLAZE_COPY"),
];

static R_NIOS2: &[(u32, &str)] = &[
    (0, "R_NIOS2_NONE"),
    (1, "R_NIOS2_S16"),
    (2, "R_NIOS2_U16"),
    (3, "R_NIOS2_PCREL16"),
    (4, "R_NIOS2_CALL26"),
    (37, "R_NIOS2_COPY"),
    (38, "R_NIOS2_GLOB_DAT"),
    (39, "R_NIOS2_JUMP_SLOT"),
    (40, "R_NIOS2_RELATIVE"),
];

static R_ARC: &[(u32, &str)] = &[
    (0, "R_ARC_NONE"),
    (4, "R_ARC_32"),
    (53, "R_ARC_COPY"),
    (54, "R_ARC_GLOB_DAT"),
    (55, "R_ARC_JUMP_SLOT"),
    (56, "R_ARC_RELATIVE"),
];

static R_CKCORE: &[(u32, &str)] = &[
    (0, "R_CKCORE_NONE"),
    (1, "R_CKCORE_ADDR32"),
    (5, "R_CKCORE_PCREL32"),
    (9, "R_CKCORE_RELATIVE"),
    (10, "R_CKCORE_COPY"),
    (11, "R_CKCORE_GLOB_DAT"),
    (12, "R_CKCORE_JUMP_SLOT"),
];
