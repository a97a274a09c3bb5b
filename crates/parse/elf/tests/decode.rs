//! Decoding of complete synthetic images, for both classes and byte orders.

mod common;

use common::{Image, MAIN_ADDRESS, Placement, LAYOUTS, static_image};
use kestrel_elf::{
    Class, DecodeConfig, ElfError, Endianness, ErrorKind, IdentError, SectionType, SegmentType,
    Session, SymbolBinding, SymbolTable, SymbolType,
};

fn decode(bytes: &[u8]) -> Session {
    Session::from_bytes(bytes).expect("image decodes")
}

// ---------------------------------------------------------------------------
// Symbols
// ---------------------------------------------------------------------------

#[test]
fn main_symbol_resolves_in_every_layout() {
    for (class, order) in LAYOUTS {
        let session = decode(&static_image(class, order).build());
        assert_eq!(session.class(), class);
        assert_eq!(session.endianness(), order);
        assert_eq!(session.header().e_entry, MAIN_ADDRESS);
        assert_eq!(session.symbols()["main"], MAIN_ADDRESS, "{class} {order}");
        // Zero-valued static symbols stay out of the address map.
        assert!(!session.symbols().contains_key("undef"));

        let main = session
            .symbol_entries()
            .iter()
            .find(|s| s.name == "main")
            .expect("main entry");
        assert_eq!(main.table, SymbolTable::Static);
        assert_eq!(main.binding, SymbolBinding::Global);
        assert_eq!(main.kind, SymbolType::Func);
        assert_eq!(main.size, 16);
        assert_eq!(main.index, 1);
        assert_eq!(session.symbol_entries().len(), 3);
    }
}

#[test]
fn sections_are_named_and_typed() {
    let session = decode(&static_image(Class::Elf64, Endianness::Big).build());
    let names: Vec<_> = session.sections().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["", ".text", ".strtab", ".symtab", ".shstrtab"]);

    let text = session.section_by_name(".text").expect(".text");
    assert_eq!(text.kind, SectionType::ProgBits);
    assert_eq!(text.address(), MAIN_ADDRESS);
    assert_eq!(text.size(), 16);
    assert!(session.section_by_name(".data").is_none());
}

#[test]
fn zero_symbols_can_be_included() {
    let config = DecodeConfig::from_toml_str("static_zero_symbols = \"include\"").unwrap();
    let image = static_image(Class::Elf32, Endianness::Little).build();
    let session = Session::from_source(&kestrel_elf::EagerSource::from_bytes(&image), &config)
        .unwrap();
    assert_eq!(session.symbols().get("undef"), Some(&0));
}

#[test]
fn string_at_reads_any_string_table() {
    let session = decode(&static_image(Class::Elf64, Endianness::Little).build());
    let strtab = session.section_by_name(".strtab").unwrap().index;
    assert_eq!(session.string_at(strtab, 1).unwrap(), "main");
    assert_eq!(session.string_at(strtab, 3).unwrap(), "in");
    assert_eq!(
        session.string_at(strtab, 500).unwrap_err().kind(),
        ErrorKind::UnresolvedReference
    );
    // `.text` holds code, not strings.
    assert!(session.string_at(1, 0).is_err());
}

#[test]
fn padded_symbol_entries_use_declared_stride() {
    for (class, order) in LAYOUTS {
        let mut img = static_image(class, order);
        let stride = img.sym_size() + 8;
        let symtab = 3;
        let size = img.sym_size() as usize;
        let spec = img.spec(symtab);
        let padded: Vec<u8> = spec
            .data
            .chunks(size)
            .flat_map(|entry| entry.iter().copied().chain([0xee; 8]))
            .collect();
        spec.data = padded;
        spec.entsize = stride;

        let session = decode(&img.build());
        assert_eq!(session.symbols()["main"], MAIN_ADDRESS);
        assert_eq!(session.symbol_entries().len(), 3);
    }
}

#[test]
fn short_entry_size_is_an_error_only_when_strict() {
    let mut img = static_image(Class::Elf64, Endianness::Little);
    img.spec(3).entsize = 16;
    let bytes = img.build();

    // Lenient: the record size is used instead.
    let session = decode(&bytes);
    assert_eq!(session.symbols()["main"], MAIN_ADDRESS);

    let config = DecodeConfig {
        strict_entry_sizes: true,
        ..DecodeConfig::default()
    };
    let err = Session::from_source(&kestrel_elf::EagerSource::from_bytes(&bytes), &config)
        .unwrap_err();
    assert!(matches!(
        err,
        ElfError::TruncatedInput {
            what: "symbol table",
            len: 24,
            available: 16,
            ..
        }
    ));
}

// ---------------------------------------------------------------------------
// Malformed input
// ---------------------------------------------------------------------------

#[test]
fn wrong_magic_is_malformed_identification() {
    let mut bytes = static_image(Class::Elf64, Endianness::Little).build();
    bytes[1..4].copy_from_slice(&[0, 0, 0]);
    let err = Session::from_bytes(&bytes).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedIdentification);
    assert!(matches!(
        err,
        ElfError::MalformedIdentification(IdentError::BadMagic([0x7f, 0, 0, 0]))
    ));
}

#[test]
fn unknown_encoding_is_malformed_identification() {
    let mut bytes = static_image(Class::Elf32, Endianness::Big).build();
    bytes[5] = 3;
    assert!(matches!(
        Session::from_bytes(&bytes),
        Err(ElfError::MalformedIdentification(IdentError::UnknownEncoding(3)))
    ));
}

#[test]
fn section_count_past_end_is_truncated() {
    for (class, order) in LAYOUTS {
        let img = static_image(class, order);
        let mut bytes = img.build();
        img.patch_u16(&mut bytes, img.e_shnum_offset(), 200);
        let err = Session::from_bytes(&bytes).unwrap_err();
        assert!(
            matches!(
                err,
                ElfError::TruncatedInput {
                    what: "section header table",
                    ..
                }
            ),
            "{class} {order}: {err}"
        );
    }
}

#[test]
fn truncated_header_is_truncated_input() {
    let bytes = static_image(Class::Elf64, Endianness::Little).build();
    let err = Session::from_bytes(&bytes[..40]).unwrap_err();
    assert!(matches!(
        err,
        ElfError::TruncatedInput {
            what: "file header",
            ..
        }
    ));
}

#[test]
fn symbol_table_link_out_of_range() {
    let mut img = static_image(Class::Elf32, Endianness::Little);
    img.spec(3).link = 99;
    let err = Session::from_bytes(&img.build()).unwrap_err();
    assert!(matches!(
        err,
        ElfError::UnresolvedReference {
            what: "section link",
            index: 99,
            bound: 5
        }
    ));
}

#[test]
fn symbol_name_out_of_range() {
    let mut img = static_image(Class::Elf64, Endianness::Big);
    let bogus = img.sym(0x400, 0x10, 0, common::global(common::STT_FUNC), 1);
    img.spec(3).data.extend(bogus);
    let err = Session::from_bytes(&img.build()).unwrap_err();
    assert!(matches!(
        err,
        ElfError::UnresolvedReference {
            what: "symbol name",
            index: 0x400,
            ..
        }
    ));
}

#[test]
fn extended_section_numbering() {
    for (class, order) in LAYOUTS {
        let mut img = static_image(class, order);
        img.extended_numbering = true;
        let session = decode(&img.build());
        assert_eq!(session.header().e_shnum, 0);
        assert_eq!(session.sections().len(), 5);
        assert_eq!(session.sections()[4].name, ".shstrtab");
        assert_eq!(session.symbols()["main"], MAIN_ADDRESS);
    }
}

// ---------------------------------------------------------------------------
// Segments and addresses
// ---------------------------------------------------------------------------

fn load_image(class: Class, order: Endianness) -> Image {
    let mut img = static_image(class, order);
    img.segment(
        SegmentType::Load,
        5,
        0x2000,
        Placement::Range {
            offset: 0x1000,
            filesz: 0x200,
        },
    );
    img.segment(SegmentType::Note, 4, 0x9000, Placement::Range { offset: 0, filesz: 0x40 });
    img
}

#[test]
fn load_segment_translation() {
    for (class, order) in LAYOUTS {
        let session = decode(&load_image(class, order).build());
        assert_eq!(session.segments().len(), 2);
        assert_eq!(session.load_segments().count(), 1);
        assert_eq!(session.offset_to_address(0x1050), Some(0x2050));
        assert_eq!(session.address_to_offset(0x2050), Some(0x1050));
        assert_eq!(session.offset_to_address(0x1200), Some(0x2200));
        assert_eq!(session.offset_to_address(0x1201), None);
        // Only PT_LOAD segments take part in translation.
        assert_eq!(session.address_to_offset(0x9010), None);
    }
}

#[test]
fn segment_flags_and_kinds() {
    let session = decode(&load_image(Class::Elf32, Endianness::Big).build());
    let load = &session.segments()[0];
    assert_eq!(load.kind, SegmentType::Load);
    assert!(load.flags.contains(kestrel_elf::SegmentFlags::R | kestrel_elf::SegmentFlags::X));
    assert!(!load.flags.contains(kestrel_elf::SegmentFlags::W));
    assert_eq!(load.header.p_align, 0x1000);
}

// ---------------------------------------------------------------------------
// Rebase
// ---------------------------------------------------------------------------

#[test]
fn rebase_shifts_every_symbol() {
    let mut session = decode(&static_image(Class::Elf64, Endianness::Little).build());
    assert_eq!(session.address(), 0);
    session.rebase(0x7f00_0000_0000);
    assert_eq!(session.address(), 0x7f00_0000_0000);
    assert_eq!(session.symbols()["main"], 0x7f00_0000_0000 + MAIN_ADDRESS);
    session.rebase(0);
    assert_eq!(session.symbols()["main"], MAIN_ADDRESS);
}

#[test]
fn rebase_is_linear() {
    let bytes = static_image(Class::Elf32, Endianness::Big).build();
    let (delta, delta2) = (0x1000u64, 0xffff_f000u64);

    let mut twice = decode(&bytes);
    twice.rebase(delta);
    twice.rebase(delta.wrapping_add(delta2));

    let mut once = decode(&bytes);
    once.rebase(delta.wrapping_add(delta2));

    assert_eq!(twice.symbols(), once.symbols());
    assert_eq!(twice.address(), once.address());
}
