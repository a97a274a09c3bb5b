//! Builder for synthetic ELF images used by the integration tests.
//!
//! Images are laid out as: file header, program headers, section data (in
//! the order added, each aligned to 8 unless placed explicitly), the
//! section name table, then the section header table.

#![allow(dead_code, clippy::cast_possible_truncation)]

use kestrel_elf::{Class, Endianness, SectionType, SegmentType};

/// All four class and byte-order combinations.
pub const LAYOUTS: [(Class, Endianness); 4] = [
    (Class::Elf32, Endianness::Little),
    (Class::Elf32, Endianness::Big),
    (Class::Elf64, Endianness::Little),
    (Class::Elf64, Endianness::Big),
];

pub const ET_EXEC: u16 = 2;
pub const ET_DYN: u16 = 3;

/// A NUL-terminated string table under construction.
pub struct Strings {
    data: Vec<u8>,
}

impl Strings {
    pub fn new() -> Self {
        Self { data: vec![0] }
    }

    pub fn add(&mut self, s: &str) -> u32 {
        let offset = self.data.len() as u32;
        self.data.extend_from_slice(s.as_bytes());
        self.data.push(0);
        offset
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.data.clone()
    }
}

pub struct SectionSpec {
    pub name: String,
    pub sh_type: u32,
    pub flags: u64,
    pub addr: u64,
    pub data: Vec<u8>,
    pub link: u32,
    pub info: u32,
    pub align: u64,
    pub entsize: u64,
    /// Fixed file offset for the data; must not precede earlier data.
    pub offset: Option<u64>,
}

pub enum Placement {
    /// Covers the data of the section with this index.
    Section(usize),
    /// Explicit file range.
    Range { offset: u64, filesz: u64 },
}

pub struct SegmentSpec {
    pub p_type: u32,
    pub flags: u32,
    pub vaddr: u64,
    pub memsz: Option<u64>,
    pub place: Placement,
}

pub struct Image {
    pub class: Class,
    pub order: Endianness,
    pub e_type: u16,
    pub machine: u16,
    pub entry: u64,
    pub section_headers: bool,
    pub extended_numbering: bool,
    sections: Vec<SectionSpec>,
    segments: Vec<SegmentSpec>,
}

impl Image {
    pub fn new(class: Class, order: Endianness, machine: u16) -> Self {
        Self {
            class,
            order,
            e_type: ET_EXEC,
            machine,
            entry: 0,
            section_headers: true,
            extended_numbering: false,
            sections: Vec::new(),
            segments: Vec::new(),
        }
    }

    pub fn is64(&self) -> bool {
        self.class == Class::Elf64
    }

    // -----------------------------------------------------------------------
    // Encoding
    // -----------------------------------------------------------------------

    pub fn u16(&self, out: &mut Vec<u8>, v: u16) {
        out.extend_from_slice(&match self.order {
            Endianness::Little => v.to_le_bytes(),
            Endianness::Big => v.to_be_bytes(),
        });
    }

    pub fn u32(&self, out: &mut Vec<u8>, v: u32) {
        out.extend_from_slice(&match self.order {
            Endianness::Little => v.to_le_bytes(),
            Endianness::Big => v.to_be_bytes(),
        });
    }

    pub fn u64(&self, out: &mut Vec<u8>, v: u64) {
        out.extend_from_slice(&match self.order {
            Endianness::Little => v.to_le_bytes(),
            Endianness::Big => v.to_be_bytes(),
        });
    }

    /// A class-sized word (`Addr`, `Off`, `Xword`).
    pub fn word(&self, out: &mut Vec<u8>, v: u64) {
        if self.is64() {
            self.u64(out, v);
        } else {
            self.u32(out, v as u32);
        }
    }

    pub fn ehdr_size(&self) -> usize {
        if self.is64() { 64 } else { 52 }
    }

    pub fn shdr_size(&self) -> usize {
        if self.is64() { 64 } else { 40 }
    }

    pub fn phdr_size(&self) -> usize {
        if self.is64() { 56 } else { 32 }
    }

    pub fn sym_size(&self) -> u64 {
        if self.is64() { 24 } else { 16 }
    }

    pub fn dyn_size(&self) -> u64 {
        if self.is64() { 16 } else { 8 }
    }

    pub fn rel_size(&self) -> u64 {
        if self.is64() { 16 } else { 8 }
    }

    pub fn rela_size(&self) -> u64 {
        if self.is64() { 24 } else { 12 }
    }

    // -----------------------------------------------------------------------
    // Records
    // -----------------------------------------------------------------------

    pub fn sym(&self, name: u32, value: u64, size: u64, info: u8, shndx: u16) -> Vec<u8> {
        let mut out = Vec::new();
        self.u32(&mut out, name);
        if self.is64() {
            out.push(info);
            out.push(0);
            self.u16(&mut out, shndx);
            self.u64(&mut out, value);
            self.u64(&mut out, size);
        } else {
            self.u32(&mut out, value as u32);
            self.u32(&mut out, size as u32);
            out.push(info);
            out.push(0);
            self.u16(&mut out, shndx);
        }
        out
    }

    pub fn dyn_entry(&self, tag: i64, value: u64) -> Vec<u8> {
        let mut out = Vec::new();
        self.word(&mut out, tag as u64);
        self.word(&mut out, value);
        out
    }

    fn info(&self, sym: u32, kind: u32) -> u64 {
        if self.is64() {
            (u64::from(sym) << 32) | u64::from(kind)
        } else {
            u64::from((sym << 8) | (kind & 0xff))
        }
    }

    pub fn rel(&self, offset: u64, sym: u32, kind: u32) -> Vec<u8> {
        let mut out = Vec::new();
        self.word(&mut out, offset);
        self.word(&mut out, self.info(sym, kind));
        out
    }

    pub fn rela(&self, offset: u64, sym: u32, kind: u32, addend: i64) -> Vec<u8> {
        let mut out = self.rel(offset, sym, kind);
        self.word(&mut out, addend as u64);
        out
    }

    /// One note record with 4-byte padding.
    pub fn note(&self, name: &[u8], kind: u32, desc: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        self.u32(&mut out, name.len() as u32);
        self.u32(&mut out, desc.len() as u32);
        self.u32(&mut out, kind);
        out.extend_from_slice(name);
        out.resize(out.len().next_multiple_of(4), 0);
        out.extend_from_slice(desc);
        out.resize(out.len().next_multiple_of(4), 0);
        out
    }

    // -----------------------------------------------------------------------
    // Assembly
    // -----------------------------------------------------------------------

    /// Adds a section and returns its index in the section header table.
    pub fn section(&mut self, name: &str, sh_type: SectionType, data: Vec<u8>) -> usize {
        self.sections.push(SectionSpec {
            name: name.to_owned(),
            sh_type: sh_type.raw(),
            flags: 0,
            addr: 0,
            data,
            link: 0,
            info: 0,
            align: 1,
            entsize: 0,
            offset: None,
        });
        self.sections.len()
    }

    /// Mutable access to a section added earlier, by header table index.
    pub fn spec(&mut self, index: usize) -> &mut SectionSpec {
        &mut self.sections[index - 1]
    }

    pub fn segment(&mut self, p_type: SegmentType, flags: u32, vaddr: u64, place: Placement) {
        self.segments.push(SegmentSpec {
            p_type: p_type.raw(),
            flags,
            vaddr,
            memsz: None,
            place,
        });
    }

    pub fn last_segment(&mut self) -> &mut SegmentSpec {
        self.segments.last_mut().expect("no segment added")
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = vec![0; self.ehdr_size()];

        let phoff = if self.segments.is_empty() { 0 } else { out.len() as u64 };
        out.resize(out.len() + self.segments.len() * self.phdr_size(), 0);

        let mut offsets = vec![0u64];
        for sec in &self.sections {
            match sec.offset {
                Some(at) => {
                    assert!(at as usize >= out.len(), "section {} overlaps", sec.name);
                    out.resize(at as usize, 0);
                }
                None => out.resize(out.len().next_multiple_of(8), 0),
            }
            offsets.push(out.len() as u64);
            out.extend_from_slice(&sec.data);
        }

        let mut names = Strings::new();
        let name_offsets: Vec<u32> = self.sections.iter().map(|s| names.add(&s.name)).collect();
        let shstrtab_name = names.add(".shstrtab");
        let shstrtab_offset = out.len() as u64;
        let shstrtab = names.bytes();
        if self.section_headers {
            out.extend_from_slice(&shstrtab);
        }

        let shnum = self.sections.len() + 2;
        let shstrndx = self.sections.len() + 1;
        let mut shoff = 0;
        if self.section_headers {
            out.resize(out.len().next_multiple_of(8), 0);
            shoff = out.len() as u64;
            let mut table = Vec::new();
            let (size0, link0) = if self.extended_numbering {
                (shnum as u64, shstrndx as u32)
            } else {
                (0, 0)
            };
            self.shdr(&mut table, [0, 0, 0, 0, 0, size0, u64::from(link0), 0, 0, 0]);
            for (i, sec) in self.sections.iter().enumerate() {
                self.shdr(
                    &mut table,
                    [
                        u64::from(name_offsets[i]),
                        u64::from(sec.sh_type),
                        sec.flags,
                        sec.addr,
                        offsets[i + 1],
                        sec.data.len() as u64,
                        u64::from(sec.link),
                        u64::from(sec.info),
                        sec.align,
                        sec.entsize,
                    ],
                );
            }
            self.shdr(
                &mut table,
                [
                    u64::from(shstrtab_name),
                    u64::from(SectionType::StrTab.raw()),
                    0,
                    0,
                    shstrtab_offset,
                    shstrtab.len() as u64,
                    0,
                    0,
                    1,
                    0,
                ],
            );
            out.extend_from_slice(&table);
        }

        let mut phdrs = Vec::new();
        for seg in &self.segments {
            let (offset, filesz, addr) = match seg.place {
                Placement::Section(i) => (
                    offsets[i],
                    self.sections[i - 1].data.len() as u64,
                    self.sections[i - 1].addr,
                ),
                Placement::Range { offset, filesz } => (offset, filesz, 0),
            };
            let vaddr = if seg.vaddr == 0 { addr } else { seg.vaddr };
            let memsz = seg.memsz.unwrap_or(filesz);
            if self.is64() {
                self.u32(&mut phdrs, seg.p_type);
                self.u32(&mut phdrs, seg.flags);
                for v in [offset, vaddr, vaddr, filesz, memsz, 0x1000] {
                    self.u64(&mut phdrs, v);
                }
            } else {
                self.u32(&mut phdrs, seg.p_type);
                for v in [offset, vaddr, vaddr, filesz, memsz] {
                    self.u32(&mut phdrs, v as u32);
                }
                self.u32(&mut phdrs, seg.flags);
                self.u32(&mut phdrs, 0x1000);
            }
        }
        let ph_start = self.ehdr_size();
        out[ph_start..ph_start + phdrs.len()].copy_from_slice(&phdrs);

        let mut ehdr = Vec::new();
        ehdr.extend_from_slice(b"\x7fELF");
        ehdr.push(if self.is64() { 2 } else { 1 });
        ehdr.push(match self.order {
            Endianness::Little => 1,
            Endianness::Big => 2,
        });
        ehdr.push(1);
        ehdr.push(3);
        ehdr.resize(16, 0);
        self.u16(&mut ehdr, self.e_type);
        self.u16(&mut ehdr, self.machine);
        self.u32(&mut ehdr, 1);
        self.word(&mut ehdr, self.entry);
        self.word(&mut ehdr, phoff);
        self.word(&mut ehdr, shoff);
        self.u32(&mut ehdr, 0);
        self.u16(&mut ehdr, self.ehdr_size() as u16);
        self.u16(&mut ehdr, self.phdr_size() as u16);
        self.u16(&mut ehdr, self.segments.len() as u16);
        self.u16(&mut ehdr, self.shdr_size() as u16);
        if !self.section_headers {
            self.u16(&mut ehdr, 0);
            self.u16(&mut ehdr, 0);
        } else if self.extended_numbering {
            self.u16(&mut ehdr, 0);
            self.u16(&mut ehdr, 0xffff);
        } else {
            self.u16(&mut ehdr, shnum as u16);
            self.u16(&mut ehdr, shstrndx as u16);
        }
        out[..ehdr.len()].copy_from_slice(&ehdr);
        out
    }

    /// Fields in `Elf64_Shdr` order; narrowed for ELF32.
    fn shdr(&self, out: &mut Vec<u8>, f: [u64; 10]) {
        self.u32(out, f[0] as u32);
        self.u32(out, f[1] as u32);
        for &v in &f[2..6] {
            self.word(out, v);
        }
        self.u32(out, f[6] as u32);
        self.u32(out, f[7] as u32);
        self.word(out, f[8]);
        self.word(out, f[9]);
    }

    /// File offset of the `e_shnum` field.
    pub fn e_shnum_offset(&self) -> usize {
        if self.is64() { 60 } else { 48 }
    }

    /// Writes a 16-bit value into a built image.
    pub fn patch_u16(&self, image: &mut [u8], at: usize, v: u16) {
        let bytes = match self.order {
            Endianness::Little => v.to_le_bytes(),
            Endianness::Big => v.to_be_bytes(),
        };
        image[at..at + 2].copy_from_slice(&bytes);
    }
}

/// `st_info` for a global symbol of type `kind`.
pub const fn global(kind: u8) -> u8 {
    (1 << 4) | kind
}

pub const STT_FUNC: u8 = 2;
pub const STT_OBJECT: u8 = 1;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub const MAIN_ADDRESS: u64 = 0x40_1000;

/// `.text`, `.strtab` and `.symtab` with a defined `main` and an undefined
/// `undef`, for the machine each class is usually built for.
pub fn static_image(class: Class, order: Endianness) -> Image {
    let machine = if class == Class::Elf64 { 62 } else { 3 };
    let mut img = Image::new(class, order, machine);
    img.entry = MAIN_ADDRESS;

    let text = img.section(".text", SectionType::ProgBits, vec![0x90; 16]);
    img.spec(text).addr = MAIN_ADDRESS;
    img.spec(text).flags = 0x6;

    let mut names = Strings::new();
    let main = names.add("main");
    let undef = names.add("undef");
    let strtab = img.section(".strtab", SectionType::StrTab, names.bytes());

    let mut syms = img.sym(0, 0, 0, 0, 0);
    syms.extend(img.sym(main, MAIN_ADDRESS, 16, global(STT_FUNC), text as u16));
    syms.extend(img.sym(undef, 0, 0, global(STT_FUNC), 0));
    let entsize = img.sym_size();
    let symtab = img.section(".symtab", SectionType::SymTab, syms);
    let spec = img.spec(symtab);
    spec.link = strtab as u32;
    spec.info = 1;
    spec.entsize = entsize;
    spec.align = 8;
    img
}

/// Machine, relocation section type and jump-slot code per layout.
pub fn dynamic_machine(class: Class, order: Endianness) -> (u16, SectionType, u32) {
    match (class, order) {
        (Class::Elf32, Endianness::Little) => (3, SectionType::Rel, 7),
        (Class::Elf32, Endianness::Big) => (20, SectionType::Rela, 21),
        (Class::Elf64, Endianness::Little) => (62, SectionType::Rela, 7),
        (Class::Elf64, Endianness::Big) => (21, SectionType::Rela, 21),
    }
}

pub const DF_1_NOW: u64 = 0x1;
pub const DF_1_PIE: u64 = 0x0800_0000;
pub const BUILD_ID: [u8; 20] = [0xab; 20];

/// A small shared object: interpreter, two `DT_NEEDED` libraries,
/// `DT_FLAGS_1`, a dynamic symbol table, one PLT relocation, a build ID
/// note and a version requirement on `libc.so.6`.
pub fn dynamic_image(class: Class, order: Endianness) -> Image {
    let (machine, reloc_type, jump_slot) = dynamic_machine(class, order);
    let mut img = Image::new(class, order, machine);
    img.e_type = ET_DYN;

    let interp = img.section(".interp", SectionType::ProgBits, b"/lib/ld.so.1\0".to_vec());

    let mut strings = Strings::new();
    let libc = strings.add("libc.so.6");
    let libm = strings.add("libm.so.6");
    let puts = strings.add("puts");
    let exported = strings.add("exported");
    let glibc = strings.add("GLIBC_2.2.5");
    let dynstr_data = strings.bytes();
    let dynstr_len = dynstr_data.len() as u64;
    let dynstr = img.section(".dynstr", SectionType::StrTab, dynstr_data);

    let mut syms = img.sym(0, 0, 0, 0, 0);
    syms.extend(img.sym(puts, 0, 0, global(STT_FUNC), 0));
    syms.extend(img.sym(exported, 0x1234, 8, global(STT_OBJECT), 1));
    let entsize = img.sym_size();
    let dynsym = img.section(".dynsym", SectionType::DynSym, syms);
    let spec = img.spec(dynsym);
    spec.link = dynstr as u32;
    spec.info = 1;
    spec.entsize = entsize;

    let mut dynamic = Vec::new();
    for (tag, value) in [
        (1, u64::from(libc)),
        (1, u64::from(libm)),
        (0x6fff_fffb, DF_1_PIE | DF_1_NOW),
        (10, dynstr_len),
        (0, 0),
        (1, u64::from(libc)),
    ] {
        dynamic.extend(img.dyn_entry(tag, value));
    }
    let entsize = img.dyn_size();
    let dynamic_idx = img.section(".dynamic", SectionType::Dynamic, dynamic);
    img.spec(dynamic_idx).link = dynstr as u32;
    img.spec(dynamic_idx).entsize = entsize;

    let got_plt = img.section(".got.plt", SectionType::ProgBits, vec![0; 24]);
    img.spec(got_plt).addr = 0x4000;

    let (name, relocs, entsize) = if reloc_type == SectionType::Rela {
        let mut data = img.rela(0x4018, 1, jump_slot, 0);
        data.extend(img.rela(0x4020, 0, 0, 0x10));
        (".rela.plt", data, img.rela_size())
    } else {
        let mut data = img.rel(0x4018, 1, jump_slot);
        data.extend(img.rel(0x4020, 0, 0));
        (".rel.plt", data, img.rel_size())
    };
    let plt = img.section(name, reloc_type, relocs);
    img.spec(plt).link = dynsym as u32;
    img.spec(plt).info = got_plt as u32;
    img.spec(plt).entsize = entsize;

    let note = img.note(b"GNU\0", 3, &BUILD_ID);
    let note_idx = img.section(".note.gnu.build-id", SectionType::Note, note);
    img.spec(note_idx).align = 4;

    let mut verneed = Vec::new();
    img.u16(&mut verneed, 1);
    img.u16(&mut verneed, 1);
    img.u32(&mut verneed, libc);
    img.u32(&mut verneed, 16);
    img.u32(&mut verneed, 0);
    img.u32(&mut verneed, 0x0d69_6910);
    img.u16(&mut verneed, 0);
    img.u16(&mut verneed, 2);
    img.u32(&mut verneed, glibc);
    img.u32(&mut verneed, 0);
    let verneed_idx = img.section(".gnu.version_r", SectionType::GnuVerneed, verneed);
    img.spec(verneed_idx).link = dynstr as u32;
    img.spec(verneed_idx).info = 1;

    img.segment(SegmentType::Interp, 4, 0, Placement::Section(interp));
    img.segment(SegmentType::Dynamic, 6, 0, Placement::Section(dynamic_idx));
    img
}
