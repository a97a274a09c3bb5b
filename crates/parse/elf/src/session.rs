//! The decoding session.
//!
//! Construction runs the whole pipeline once: identification, layout
//! selection, file header, section and program header tables, then every
//! table the rest of the format hangs off them. The resulting [`Session`]
//! is read-only apart from [`Session::rebase`].

use core::cmp::Ordering;
use core::marker::PhantomData;
use std::collections::BTreeMap;
use std::io::{Read, Seek};
use std::path::Path;

use kestrel_binparse::{Endianness, FromBytes, Table};

use crate::class::{Elf32, Elf64, ElfClass, RelocationRecord};
use crate::config::{Backing, DecodeConfig, ZeroSymbolPolicy};
use crate::dynamic::DynamicEntry;
use crate::error::ElfError;
use crate::header::FileHeader;
use crate::ident::{Class, EI_NIDENT, Ident};
use crate::layout::{LayoutSet, layouts_for};
use crate::note::{Note, parse_notes};
use crate::reloc::{Relocation, RelocationArch, RelocationType, relocation_arch_for_machine};
use crate::section::{Section, SectionHeader, StringTable};
use crate::segment::{ProgramHeader, Segment};
use crate::source::{EagerSource, LazySource, Source};
use crate::symbol::{Symbol, SymbolRecord, SymbolTable};
use crate::types::{
    DynamicFlags1, DynamicTag, PN_XNUM, SHN_XINDEX, SectionFlags, SectionType, SegmentFlags,
    SegmentType,
};
use crate::version::{VersionDefinition, VersionNeed, parse_definitions, parse_needs};

/// A fully decoded ELF image.
#[derive(Debug, Clone)]
pub struct Session {
    header: FileHeader,
    layouts: LayoutSet,
    sections: Vec<Section>,
    segments: Vec<Segment>,
    string_tables: BTreeMap<usize, StringTable>,
    symbol_entries: Vec<Symbol>,
    symbols: BTreeMap<String, u64>,
    dynamic_symbols: BTreeMap<String, u64>,
    dynamic_entries: Vec<DynamicEntry>,
    needed: Vec<String>,
    flags_1: DynamicFlags1,
    relocations: Vec<Relocation>,
    got: Option<usize>,
    got_plt: Option<usize>,
    interpreter: Option<String>,
    notes: Vec<Note>,
    version_definitions: Vec<VersionDefinition>,
    version_needs: Vec<VersionNeed>,
    address: u64,
}

impl Session {
    /// Decodes an in-memory image with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns the first [`ElfError`] hit while decoding.
    pub fn from_bytes(data: &[u8]) -> Result<Self, ElfError> {
        Self::from_source(&EagerSource::from_bytes(data), &DecodeConfig::default())
    }

    /// Decodes an image from a seekable handle, reading each structure on
    /// demand. The handle's current position is treated as the start of
    /// the image and is restored after every read.
    ///
    /// # Errors
    ///
    /// Returns the first [`ElfError`] hit while decoding.
    pub fn from_reader<R: Read + Seek>(reader: R, config: &DecodeConfig) -> Result<Self, ElfError> {
        Self::from_source(&LazySource::new(reader)?, config)
    }

    /// Opens and decodes the file at `path` using the configured backing.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::Io`] if the file cannot be opened or read, or the
    /// first decoding error.
    pub fn open(path: impl AsRef<Path>, config: &DecodeConfig) -> Result<Self, ElfError> {
        match config.backing {
            Backing::Eager => Self::from_source(&EagerSource::open(path)?, config),
            Backing::Lazy => Self::from_source(&LazySource::open(path)?, config),
        }
    }

    /// Decodes an image from any [`Source`].
    ///
    /// # Errors
    ///
    /// Returns the first [`ElfError`] hit while decoding. No partially
    /// decoded session is produced.
    pub fn from_source<S: Source + ?Sized>(
        source: &S,
        config: &DecodeConfig,
    ) -> Result<Self, ElfError> {
        let head_len = usize::try_from(source.len()).map_or(EI_NIDENT, |len| len.min(EI_NIDENT));
        let head = source.read_at(0, head_len)?;
        let ident = Ident::parse(&head)?;
        log::debug!("identified {} {} image", ident.class, ident.endianness);

        let layouts = layouts_for(ident.class, ident.endianness);
        log::debug!("bound {} layouts", layouts.iter().count());

        match ident.class {
            Class::Elf32 => Decoder::<S, Elf32>::new(source, config, ident).run(layouts),
            Class::Elf64 => Decoder::<S, Elf64>::new(source, config, ident).run(layouts),
        }
    }

    /// The identification block.
    #[must_use]
    pub fn ident(&self) -> &Ident {
        &self.header.ident
    }

    /// The file header.
    #[must_use]
    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    /// Word size of the image.
    #[must_use]
    pub fn class(&self) -> Class {
        self.header.ident.class
    }

    /// Byte order of the image.
    #[must_use]
    pub fn endianness(&self) -> Endianness {
        self.header.ident.endianness
    }

    /// Record layouts for the image's class and byte order.
    #[must_use]
    pub fn layouts(&self) -> &LayoutSet {
        &self.layouts
    }

    /// All sections in header table order.
    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// The first section called `name`.
    #[must_use]
    pub fn section_by_name(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// All segments in program header table order.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The `PT_LOAD` segments.
    pub fn load_segments(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter().filter(|s| s.is_load())
    }

    /// Name to address map of `.symtab`, shifted by any [`rebase`](Self::rebase).
    #[must_use]
    pub fn symbols(&self) -> &BTreeMap<String, u64> {
        &self.symbols
    }

    /// Name to address map of `.dynsym`.
    #[must_use]
    pub fn dynamic_symbols(&self) -> &BTreeMap<String, u64> {
        &self.dynamic_symbols
    }

    /// Every symbol table entry, `.symtab` first and then `.dynsym`.
    #[must_use]
    pub fn symbol_entries(&self) -> &[Symbol] {
        &self.symbol_entries
    }

    /// Dynamic entries up to, not including, the terminating `DT_NULL`.
    #[must_use]
    pub fn dynamic_entries(&self) -> &[DynamicEntry] {
        &self.dynamic_entries
    }

    /// Libraries named by `DT_NEEDED`, in order.
    #[must_use]
    pub fn needed_libraries(&self) -> &[String] {
        &self.needed
    }

    /// Union of all `DT_FLAGS_1` entries.
    #[must_use]
    pub fn dynamic_flags(&self) -> DynamicFlags1 {
        self.flags_1
    }

    /// Entries of every `SHT_REL` and `SHT_RELA` section, in section order.
    #[must_use]
    pub fn relocations(&self) -> &[Relocation] {
        &self.relocations
    }

    /// Relocation family for the image's machine.
    #[must_use]
    pub fn relocation_arch(&self) -> Option<RelocationArch> {
        relocation_arch_for_machine(self.header.e_machine)
    }

    /// The `.got` section.
    #[must_use]
    pub fn got(&self) -> Option<&Section> {
        self.got.map(|i| &self.sections[i])
    }

    /// The `.got.plt` section.
    #[must_use]
    pub fn got_plt(&self) -> Option<&Section> {
        self.got_plt.map(|i| &self.sections[i])
    }

    /// Program interpreter requested by `PT_INTERP`.
    #[must_use]
    pub fn interpreter(&self) -> Option<&str> {
        self.interpreter.as_deref()
    }

    /// Notes from every `SHT_NOTE` section.
    #[must_use]
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Entries of `.gnu.version_d`.
    #[must_use]
    pub fn version_definitions(&self) -> &[VersionDefinition] {
        &self.version_definitions
    }

    /// Entries of `.gnu.version_r`.
    #[must_use]
    pub fn version_needs(&self) -> &[VersionNeed] {
        &self.version_needs
    }

    /// Current load address. Zero until [`rebase`](Self::rebase) is called.
    #[must_use]
    pub fn address(&self) -> u64 {
        self.address
    }

    /// Moves the image to `address`, shifting every entry of
    /// [`symbols`](Self::symbols) by the same delta.
    pub fn rebase(&mut self, address: u64) {
        let delta = address.wrapping_sub(self.address);
        for value in self.symbols.values_mut() {
            *value = value.wrapping_add(delta);
        }
        self.address = address;
    }

    /// Translates a file offset to a virtual address through the first
    /// `PT_LOAD` segment that contains it.
    #[must_use]
    pub fn offset_to_address(&self, offset: u64) -> Option<u64> {
        self.load_segments().find_map(|s| s.offset_to_address(offset))
    }

    /// Translates a virtual address to a file offset through the first
    /// `PT_LOAD` segment that contains it.
    #[must_use]
    pub fn address_to_offset(&self, address: u64) -> Option<u64> {
        self.load_segments().find_map(|s| s.address_to_offset(address))
    }

    /// Resolves the string at `offset` in the string table held by section
    /// `section`.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::UnresolvedReference`] if `section` is not a
    /// string table or `offset` lies outside it.
    pub fn string_at(&self, section: usize, offset: u32) -> Result<String, ElfError> {
        self.string_tables
            .get(&section)
            .ok_or(ElfError::UnresolvedReference {
                what: "string table",
                index: section as u64,
                bound: self.sections.len() as u64,
            })?
            .resolve(offset, "string")
    }
}

/// Well-known sections, by index.
#[derive(Debug, Default)]
struct Recognized {
    symtab: Option<usize>,
    dynsym: Option<usize>,
    strtab: Option<usize>,
    dynstr: Option<usize>,
    dynamic: Option<usize>,
    got: Option<usize>,
    got_plt: Option<usize>,
    verdef: Option<usize>,
    verneed: Option<usize>,
    relocations: Vec<usize>,
    notes: Vec<usize>,
}

fn claim(slot: &mut Option<usize>, index: usize, name: &str) {
    if let Some(previous) = slot.replace(index) {
        log::warn!("section {index} ({name}) replaces earlier section {previous}");
    }
}

impl Recognized {
    fn classify(sections: &[Section]) -> Self {
        let mut found = Self::default();
        for s in sections {
            let i = s.index;
            match (s.kind, s.name.as_str()) {
                (SectionType::SymTab, _) => claim(&mut found.symtab, i, &s.name),
                (SectionType::DynSym, _) => claim(&mut found.dynsym, i, &s.name),
                (SectionType::Dynamic, _) => claim(&mut found.dynamic, i, &s.name),
                (SectionType::StrTab, ".strtab") => claim(&mut found.strtab, i, &s.name),
                (SectionType::StrTab, ".dynstr") => claim(&mut found.dynstr, i, &s.name),
                (SectionType::Rel | SectionType::Rela, _) => found.relocations.push(i),
                (SectionType::Note, _) => found.notes.push(i),
                (SectionType::GnuVerdef, _) => claim(&mut found.verdef, i, &s.name),
                (SectionType::GnuVerneed, _) => claim(&mut found.verneed, i, &s.name),
                (_, ".got") => claim(&mut found.got, i, &s.name),
                (_, ".got.plt") => claim(&mut found.got_plt, i, &s.name),
                _ => {}
            }
        }
        found
    }
}

/// Decoding state for one image of class `C`.
struct Decoder<'s, S: ?Sized, C> {
    source: &'s S,
    config: &'s DecodeConfig,
    ident: Ident,
    order: Endianness,
    class: PhantomData<C>,
}

impl<'s, S: Source + ?Sized, C: ElfClass> Decoder<'s, S, C> {
    fn new(source: &'s S, config: &'s DecodeConfig, ident: Ident) -> Self {
        Self {
            source,
            config,
            ident,
            order: ident.endianness,
            class: PhantomData,
        }
    }

    fn run(self, layouts: LayoutSet) -> Result<Session, ElfError> {
        let header = self.file_header()?;
        log::debug!(
            "header parsed: {} {} with {} sections, {} segments",
            header.e_type,
            header.e_machine,
            header.e_shnum,
            header.e_phnum
        );

        let headers = self.section_headers(&header)?;
        let segments = self.segments(&header, headers.first())?;
        let string_tables = self.string_tables(&header, &headers)?;
        let sections = self.name_sections(&header, headers, &string_tables)?;
        log::debug!(
            "tables located: {} sections, {} segments",
            sections.len(),
            segments.len()
        );

        let found = Recognized::classify(&sections);

        let mut tables = BTreeMap::new();
        for s in &sections {
            let kind = match s.kind {
                SectionType::SymTab => SymbolTable::Static,
                SectionType::DynSym => SymbolTable::Dynamic,
                _ => continue,
            };
            let fallback = match kind {
                SymbolTable::Static => found.strtab,
                SymbolTable::Dynamic => found.dynstr,
            };
            let strtab = linked_string_table(&sections, &string_tables, s, fallback)?;
            tables.insert(s.index, self.symbols(kind, s, strtab)?);
        }

        let mut symbols = BTreeMap::new();
        let mut dynamic_symbols = BTreeMap::new();
        let mut symbol_entries = Vec::new();
        if let Some(entries) = found.symtab.and_then(|i| tables.get(&i)) {
            fill_address_map(&mut symbols, entries, self.config.static_zero_symbols);
            symbol_entries.extend_from_slice(entries);
        }
        if let Some(entries) = found.dynsym.and_then(|i| tables.get(&i)) {
            fill_address_map(&mut dynamic_symbols, entries, self.config.dynamic_zero_symbols);
            symbol_entries.extend_from_slice(entries);
        }

        let (dynamic_entries, needed, flags_1) =
            self.dynamic(&sections, &segments, &string_tables, &found)?;

        let arch = relocation_arch_for_machine(header.e_machine);
        let mut relocations = Vec::new();
        for &i in &found.relocations {
            relocations.extend(self.relocations(&sections[i], arch, &sections, &tables, &found)?);
        }

        let interpreter = self.interpreter(&segments)?;

        let mut notes = Vec::new();
        for &i in &found.notes {
            let s = &sections[i];
            let data = self.section_data(s, "note section")?;
            notes.extend(parse_notes(
                &s.name,
                &data,
                s.offset(),
                s.header.sh_addralign,
                self.order,
            )?);
        }

        let version_definitions = match found.verdef {
            Some(i) => {
                let s = &sections[i];
                let strtab = linked_string_table(&sections, &string_tables, s, found.dynstr)?;
                let data = self.section_data(s, "version definitions")?;
                parse_definitions(&data, s.offset(), s.header.sh_info, self.order, strtab)?
            }
            None => Vec::new(),
        };
        let version_needs = match found.verneed {
            Some(i) => {
                let s = &sections[i];
                let strtab = linked_string_table(&sections, &string_tables, s, found.dynstr)?;
                let data = self.section_data(s, "version requirements")?;
                parse_needs(&data, s.offset(), s.header.sh_info, self.order, strtab)?
            }
            None => Vec::new(),
        };

        log::debug!(
            "decoded: {} symbols, {} dynamic entries, {} relocations",
            symbol_entries.len(),
            dynamic_entries.len(),
            relocations.len()
        );

        Ok(Session {
            header,
            layouts,
            got: found.got,
            got_plt: found.got_plt,
            sections,
            segments,
            string_tables,
            symbol_entries,
            symbols,
            dynamic_symbols,
            dynamic_entries,
            needed,
            flags_1,
            relocations,
            interpreter,
            notes,
            version_definitions,
            version_needs,
            address: 0,
        })
    }

    fn file_header(&self) -> Result<FileHeader, ElfError> {
        let size = size_of::<C::Ehdr>();
        let bytes = self
            .source
            .read_at(0, size)
            .map_err(|e| e.reading("file header"))?;
        let raw = C::Ehdr::read_from(&bytes).ok_or(ElfError::TruncatedInput {
            what: "file header",
            offset: 0,
            len: size as u64,
            available: bytes.len() as u64,
        })?;
        let header = C::file_header(&raw, self.ident);
        if usize::from(header.e_ehsize) != size {
            log::warn!(
                "e_ehsize is {} but a {} header is {size} bytes",
                header.e_ehsize,
                C::CLASS
            );
        }
        Ok(header)
    }

    /// Works out the stride of a table from its declared entry size.
    fn stride(
        &self,
        what: &'static str,
        offset: u64,
        declared: u64,
        size: usize,
    ) -> Result<usize, ElfError> {
        let record = size as u64;
        if declared == 0 {
            return Ok(size);
        }
        match declared.cmp(&record) {
            Ordering::Equal => Ok(size),
            Ordering::Greater => {
                log::warn!("{what}: entry size {declared} exceeds record size {size}");
                usize::try_from(declared).map_err(|_| ElfError::TruncatedInput {
                    what,
                    offset,
                    len: declared,
                    available: self.source.len(),
                })
            }
            Ordering::Less if self.config.strict_entry_sizes => Err(ElfError::TruncatedInput {
                what,
                offset,
                len: record,
                available: declared,
            }),
            Ordering::Less => {
                log::warn!("{what}: entry size {declared} is smaller than record size {size}");
                Ok(size)
            }
        }
    }

    /// Reads `count` records of `stride` bytes at `offset` and widens each.
    fn records<T: FromBytes, U>(
        &self,
        what: &'static str,
        offset: u64,
        count: usize,
        stride: usize,
        widen: impl FnMut(&T) -> U,
    ) -> Result<Vec<U>, ElfError> {
        if count == 0 {
            return Ok(Vec::new());
        }
        let span = (count as u64 - 1)
            .checked_mul(stride as u64)
            .and_then(|n| n.checked_add(size_of::<T>() as u64));
        let len = span
            .and_then(|n| usize::try_from(n).ok())
            .ok_or(ElfError::TruncatedInput {
                what,
                offset,
                len: span.unwrap_or(u64::MAX),
                available: self.source.len(),
            })?;
        let bytes = self
            .source
            .read_at(offset, len)
            .map_err(|e| e.reading(what))?;
        let table = Table::<T>::parse(&bytes, 0, count, stride)
            .map_err(|e| ElfError::from(e).reading(what))?;
        Ok(table.iter().map(widen).collect())
    }

    fn section_headers(&self, header: &FileHeader) -> Result<Vec<SectionHeader>, ElfError> {
        const WHAT: &str = "section header table";
        if header.e_shoff == 0 {
            return Ok(Vec::new());
        }
        let size = size_of::<C::Shdr>();
        let stride = self.stride(WHAT, header.e_shoff, u64::from(header.e_shentsize), size)?;
        let o = self.order;
        let widen = |raw: &C::Shdr| C::section_header(raw, o);

        let mut count = usize::from(header.e_shnum);
        if count == 0 {
            // Extended numbering: the real count lives in section 0.
            let first = self.records(WHAT, header.e_shoff, 1, stride, widen)?;
            let declared = first.first().map_or(0, |s| s.sh_size);
            count = usize::try_from(declared).map_err(|_| ElfError::TruncatedInput {
                what: WHAT,
                offset: header.e_shoff,
                len: declared,
                available: self.source.len(),
            })?;
        }
        self.records(WHAT, header.e_shoff, count, stride, widen)
    }

    fn segments(
        &self,
        header: &FileHeader,
        first_section: Option<&SectionHeader>,
    ) -> Result<Vec<Segment>, ElfError> {
        const WHAT: &str = "program header table";
        let count = match (header.e_phnum, first_section) {
            (PN_XNUM, Some(s)) => s.sh_info as usize,
            (n, _) => usize::from(n),
        };
        if header.e_phoff == 0 || count == 0 {
            return Ok(Vec::new());
        }
        let size = size_of::<C::Phdr>();
        let stride = self.stride(WHAT, header.e_phoff, u64::from(header.e_phentsize), size)?;
        let o = self.order;
        let widen = |raw: &C::Phdr| C::program_header(raw, o);
        let headers: Vec<ProgramHeader> =
            self.records(WHAT, header.e_phoff, count, stride, widen)?;
        Ok(headers
            .into_iter()
            .enumerate()
            .map(|(index, header)| Segment {
                index,
                kind: SegmentType::from_raw(header.p_type),
                flags: SegmentFlags::from_bits_retain(header.p_flags),
                header,
            })
            .collect())
    }

    /// Loads every `SHT_STRTAB` section, plus the section name table if it
    /// has some other type.
    fn string_tables(
        &self,
        header: &FileHeader,
        headers: &[SectionHeader],
    ) -> Result<BTreeMap<usize, StringTable>, ElfError> {
        let mut tables = BTreeMap::new();
        for (index, sh) in headers.iter().enumerate() {
            if sh.sh_type == SectionType::StrTab.raw() {
                tables.insert(index, StringTable::new(self.data(sh, "string table")?));
            }
        }
        if let Some(index) = shstrndx(header, headers)? {
            if !tables.contains_key(&index) {
                let data = self.data(&headers[index], "section name table")?;
                tables.insert(index, StringTable::new(data));
            }
        }
        Ok(tables)
    }

    fn name_sections(
        &self,
        header: &FileHeader,
        headers: Vec<SectionHeader>,
        string_tables: &BTreeMap<usize, StringTable>,
    ) -> Result<Vec<Section>, ElfError> {
        let names = shstrndx(header, &headers)?.and_then(|i| string_tables.get(&i));
        let file_len = self.source.len();
        headers
            .into_iter()
            .enumerate()
            .map(|(index, header)| {
                let name = match names {
                    Some(table) => table.resolve(header.sh_name, "section name")?,
                    None => String::new(),
                };
                let kind = SectionType::from_raw(header.sh_type);
                let section = Section {
                    index,
                    name,
                    kind,
                    flags: SectionFlags::from_bits_retain(header.sh_flags),
                    header,
                };
                let past_end = header
                    .sh_offset
                    .checked_add(header.sh_size)
                    .is_none_or(|end| end > file_len);
                if section.has_file_data() && past_end {
                    log::warn!(
                        "section {index} ({}) data at {:#x}+{:#x} lies outside the file",
                        section.name,
                        header.sh_offset,
                        header.sh_size
                    );
                }
                Ok(section)
            })
            .collect()
    }

    fn data(&self, sh: &SectionHeader, what: &'static str) -> Result<Vec<u8>, ElfError> {
        if sh.sh_type == SectionType::NoBits.raw() {
            return Ok(Vec::new());
        }
        let len = usize::try_from(sh.sh_size).map_err(|_| ElfError::TruncatedInput {
            what,
            offset: sh.sh_offset,
            len: sh.sh_size,
            available: self.source.len(),
        })?;
        Ok(self
            .source
            .read_at(sh.sh_offset, len)
            .map_err(|e| e.reading(what))?
            .into_owned())
    }

    fn section_data(&self, section: &Section, what: &'static str) -> Result<Vec<u8>, ElfError> {
        self.data(&section.header, what)
    }

    fn symbols(
        &self,
        table: SymbolTable,
        section: &Section,
        strtab: &StringTable,
    ) -> Result<Vec<Symbol>, ElfError> {
        let what = match table {
            SymbolTable::Static => "symbol table",
            SymbolTable::Dynamic => "dynamic symbol table",
        };
        let size = size_of::<C::Sym>();
        let stride = self.stride(what, section.offset(), section.header.sh_entsize, size)?;
        let count = usize::try_from(section.size() / stride as u64).unwrap_or(usize::MAX);
        if section.size() % stride as u64 != 0 {
            log::warn!("{}: size is not a multiple of the entry size", section.name);
        }
        let o = self.order;
        let records: Vec<SymbolRecord> =
            self.records(what, section.offset(), count, stride, |raw: &C::Sym| C::symbol(raw, o))?;
        records
            .iter()
            .enumerate()
            .map(|(index, raw)| {
                let name = strtab.resolve(raw.st_name, "symbol name")?;
                Ok(Symbol::new(table, index, name, raw))
            })
            .collect()
    }

    /// Reads `.dynamic`, or the `PT_DYNAMIC` segment if there is no such
    /// section.
    fn dynamic(
        &self,
        sections: &[Section],
        segments: &[Segment],
        string_tables: &BTreeMap<usize, StringTable>,
        found: &Recognized,
    ) -> Result<(Vec<DynamicEntry>, Vec<String>, DynamicFlags1), ElfError> {
        const WHAT: &str = "dynamic section";
        let size = size_of::<C::Dyn>();
        let section = found.dynamic.map(|i| &sections[i]);
        let (offset, len, stride) = match section {
            Some(s) => {
                let stride = self.stride(WHAT, s.offset(), s.header.sh_entsize, size)?;
                (s.offset(), s.size(), stride)
            }
            None => match segments.iter().find(|s| s.kind == SegmentType::Dynamic) {
                Some(seg) => (seg.header.p_offset, seg.header.p_filesz, size),
                None => return Ok((Vec::new(), Vec::new(), DynamicFlags1::empty())),
            },
        };
        let count = usize::try_from(len / stride as u64).unwrap_or(usize::MAX);
        let o = self.order;
        let mut entries: Vec<DynamicEntry> =
            self.records(WHAT, offset, count, stride, |raw: &C::Dyn| C::dynamic(raw, o))?;
        if let Some(end) = entries.iter().position(|e| e.tag == DynamicTag::Null) {
            entries.truncate(end);
        }

        let dynstr = match section {
            Some(s) => Some(linked_string_table(sections, string_tables, s, found.dynstr)?),
            None => found.dynstr.and_then(|i| string_tables.get(&i)),
        };
        let loaded;
        let dynstr = match dynstr {
            Some(table) => Some(table),
            None => {
                loaded = self.dynamic_string_table(&entries, segments)?;
                loaded.as_ref()
            }
        };

        let mut needed = Vec::new();
        let mut flags = DynamicFlags1::empty();
        for entry in &entries {
            match entry.tag {
                DynamicTag::Needed => {
                    let table = dynstr.ok_or(ElfError::UnresolvedReference {
                        what: "dynamic string table",
                        index: entry.d_val(),
                        bound: 0,
                    })?;
                    let offset = u32::try_from(entry.d_val()).map_err(|_| {
                        ElfError::UnresolvedReference {
                            what: "needed library name",
                            index: entry.d_val(),
                            bound: table.as_bytes().len() as u64,
                        }
                    })?;
                    let name = table.resolve(offset, "needed library name")?;
                    log::trace!("needs {name}");
                    needed.push(name);
                }
                DynamicTag::Flags1 => flags |= DynamicFlags1::from_bits_retain(entry.d_val()),
                _ => {}
            }
        }
        Ok((entries, needed, flags))
    }

    /// Locates the dynamic string table through `DT_STRTAB`/`DT_STRSZ` when
    /// the image has no section headers.
    fn dynamic_string_table(
        &self,
        entries: &[DynamicEntry],
        segments: &[Segment],
    ) -> Result<Option<StringTable>, ElfError> {
        let value = |tag| entries.iter().find(|e| e.tag == tag).map(DynamicEntry::d_ptr);
        let (Some(address), Some(size)) = (value(DynamicTag::StrTab), value(DynamicTag::StrSz))
        else {
            return Ok(None);
        };
        let Some(offset) = segments
            .iter()
            .filter(|s| s.is_load())
            .find_map(|s| s.address_to_offset(address))
        else {
            log::warn!("DT_STRTAB {address:#x} is not inside any PT_LOAD segment");
            return Ok(None);
        };
        let len = usize::try_from(size).map_err(|_| ElfError::TruncatedInput {
            what: "dynamic string table",
            offset,
            len: size,
            available: self.source.len(),
        })?;
        let bytes = self
            .source
            .read_at(offset, len)
            .map_err(|e| e.reading("dynamic string table"))?;
        Ok(Some(StringTable::new(bytes.into_owned())))
    }

    fn relocations(
        &self,
        section: &Section,
        arch: Option<RelocationArch>,
        sections: &[Section],
        tables: &BTreeMap<usize, Vec<Symbol>>,
        found: &Recognized,
    ) -> Result<Vec<Relocation>, ElfError> {
        let o = self.order;
        let rela = section.kind == SectionType::Rela;
        let what = "relocation table";
        let size = if rela {
            size_of::<C::Rela>()
        } else {
            size_of::<C::Rel>()
        };
        let stride = self.stride(what, section.offset(), section.header.sh_entsize, size)?;
        let count = usize::try_from(section.size() / stride as u64).unwrap_or(usize::MAX);
        log::trace!("{}: {count} {} entries", section.name, section.kind);

        let records: Vec<RelocationRecord> = if rela {
            self.records(what, section.offset(), count, stride, |raw: &C::Rela| C::rela(raw, o))?
        } else {
            self.records(what, section.offset(), count, stride, |raw: &C::Rel| C::rel(raw, o))?
        };

        let symbols = if self.config.resolve_relocation_names {
            let link = section.header.sh_link as usize;
            let linked = match link {
                0 => None,
                _ => Some(sections.get(link).ok_or(ElfError::UnresolvedReference {
                    what: "section link",
                    index: link as u64,
                    bound: sections.len() as u64,
                })?),
            };
            linked
                .and_then(|s| tables.get(&s.index))
                .or_else(|| found.dynsym.and_then(|i| tables.get(&i)))
        } else {
            None
        };

        records
            .into_iter()
            .map(|r| {
                let symbol_name = match (symbols, r.r_sym) {
                    (_, 0) | (None, _) => None,
                    (Some(table), sym) => Some(
                        table
                            .get(sym as usize)
                            .ok_or(ElfError::UnresolvedReference {
                                what: "relocation symbol",
                                index: u64::from(sym),
                                bound: table.len() as u64,
                            })?
                            .name
                            .clone(),
                    ),
                };
                Ok(Relocation {
                    section: section.name.clone(),
                    offset: r.r_offset,
                    info: r.r_info,
                    sym: r.r_sym,
                    kind: RelocationType {
                        arch,
                        code: r.r_type,
                    },
                    addend: r.r_addend,
                    symbol_name,
                })
            })
            .collect()
    }

    fn interpreter(&self, segments: &[Segment]) -> Result<Option<String>, ElfError> {
        let Some(seg) = segments.iter().find(|s| s.kind == SegmentType::Interp) else {
            return Ok(None);
        };
        let h = &seg.header;
        let len = usize::try_from(h.p_filesz).map_err(|_| ElfError::TruncatedInput {
            what: "interpreter path",
            offset: h.p_offset,
            len: h.p_filesz,
            available: self.source.len(),
        })?;
        let bytes = self
            .source
            .read_at(h.p_offset, len)
            .map_err(|e| e.reading("interpreter path"))?;
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        Ok(Some(String::from_utf8_lossy(&bytes[..end]).into_owned()))
    }
}

/// Index of the section name table, following `SHN_XINDEX` into section 0.
fn shstrndx(header: &FileHeader, headers: &[SectionHeader]) -> Result<Option<usize>, ElfError> {
    let index = match (header.e_shstrndx, headers.first()) {
        (0, _) | (_, None) => return Ok(None),
        (SHN_XINDEX, Some(first)) => first.sh_link as usize,
        (n, _) => usize::from(n),
    };
    if index >= headers.len() {
        return Err(ElfError::UnresolvedReference {
            what: "section name table index",
            index: index as u64,
            bound: headers.len() as u64,
        });
    }
    Ok(Some(index))
}

/// The string table `section` links to through `sh_link`, or `fallback`
/// when the link is zero.
fn linked_string_table<'t>(
    sections: &[Section],
    tables: &'t BTreeMap<usize, StringTable>,
    section: &Section,
    fallback: Option<usize>,
) -> Result<&'t StringTable, ElfError> {
    static EMPTY: StringTable = StringTable::empty();

    let link = section.header.sh_link as usize;
    let index = match link {
        0 => fallback,
        _ if link >= sections.len() => {
            return Err(ElfError::UnresolvedReference {
                what: "section link",
                index: link as u64,
                bound: sections.len() as u64,
            });
        }
        _ => Some(link),
    };
    match index.and_then(|i| tables.get(&i)) {
        Some(table) => Ok(table),
        None => {
            if let Some(i) = index {
                log::warn!("{} links to section {i}, which is not a string table", section.name);
            }
            Ok(&EMPTY)
        }
    }
}

fn fill_address_map(map: &mut BTreeMap<String, u64>, entries: &[Symbol], zero: ZeroSymbolPolicy) {
    for sym in entries {
        if sym.name.is_empty() || (sym.value == 0 && zero == ZeroSymbolPolicy::Exclude) {
            continue;
        }
        map.insert(sym.name.clone(), sym.value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, IdentError};

    #[test]
    fn bad_magic_fails_before_header() {
        let mut data = vec![0x7f, 0, 0, 0];
        data.resize(64, 0);
        let err = Session::from_bytes(&data).unwrap_err();
        assert!(matches!(
            err,
            ElfError::MalformedIdentification(IdentError::BadMagic([0x7f, 0, 0, 0]))
        ));
    }

    #[test]
    fn short_input_is_truncated() {
        let err = Session::from_bytes(b"\x7fELF\x02\x01").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TruncatedInput);
    }

    #[test]
    fn header_only_image() {
        // 64-bit LE ET_EXEC x86-64 header with no tables.
        let mut data = vec![0u8; 64];
        data[..4].copy_from_slice(b"\x7fELF");
        data[4] = 2;
        data[5] = 1;
        data[6] = 1;
        data[16..18].copy_from_slice(&2u16.to_le_bytes());
        data[18..20].copy_from_slice(&62u16.to_le_bytes());
        data[24..32].copy_from_slice(&0x40_1000u64.to_le_bytes());
        data[52..54].copy_from_slice(&64u16.to_le_bytes());

        let session = Session::from_bytes(&data).unwrap();
        assert_eq!(session.class(), Class::Elf64);
        assert_eq!(session.header().e_entry, 0x40_1000);
        assert_eq!(session.relocation_arch(), Some(RelocationArch::X86_64));
        // The reported layouts describe the records the decoder used.
        let layouts = session.layouts();
        assert_eq!(layouts.class, Class::Elf64);
        assert_eq!(layouts.endianness, Endianness::Little);
        assert_eq!(layouts.header.size(), size_of::<<Elf64 as ElfClass>::Ehdr>());
        assert_eq!(layouts.symbol.size(), size_of::<<Elf64 as ElfClass>::Sym>());
        assert!(session.sections().is_empty());
        assert!(session.symbols().is_empty());
        assert_eq!(session.offset_to_address(0), None);
    }

    #[test]
    fn zero_policy_controls_address_map() {
        let sym = |name: &str, value| Symbol {
            table: SymbolTable::Static,
            index: 0,
            name: name.to_owned(),
            value,
            size: 0,
            binding: crate::types::SymbolBinding::Global,
            kind: crate::types::SymbolType::Func,
            visibility: crate::types::SymbolVisibility::Default,
            shndx: 1,
        };
        let entries = [sym("", 0x10), sym("undef", 0), sym("main", 0x40)];

        let mut map = BTreeMap::new();
        fill_address_map(&mut map, &entries, ZeroSymbolPolicy::Exclude);
        assert_eq!(map.len(), 1);
        assert_eq!(map["main"], 0x40);

        let mut map = BTreeMap::new();
        fill_address_map(&mut map, &entries, ZeroSymbolPolicy::Include);
        assert_eq!(map.len(), 2);
        assert_eq!(map["undef"], 0);
    }
}
