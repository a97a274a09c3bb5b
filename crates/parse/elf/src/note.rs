//! `SHT_NOTE` sections.

use kestrel_binparse::{Endianness, FromBytes};

use crate::error::ElfError;
use crate::raw::ElfNhdr;
use crate::types::NoteType;

/// One note record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    /// Section the note was found in.
    pub section: String,
    /// Owner name with its terminator stripped, e.g. `GNU`.
    pub name: String,
    /// Raw `n_type`. Its meaning depends on the owner.
    pub kind: u32,
    /// Descriptor bytes.
    pub desc: Vec<u8>,
}

impl Note {
    /// Typed `n_type` for notes owned by `GNU`.
    #[must_use]
    pub fn gnu_type(&self) -> Option<NoteType> {
        (self.name == "GNU").then(|| NoteType::from_raw(self.kind))
    }

    /// The build ID, if this is an `NT_GNU_BUILD_ID` note.
    #[must_use]
    pub fn build_id(&self) -> Option<&[u8]> {
        (self.gnu_type() == Some(NoteType::GnuBuildId)).then_some(self.desc.as_slice())
    }
}

fn align_up(value: usize, align: usize) -> Option<usize> {
    Some(value.checked_add(align - 1)? & !(align - 1))
}

/// Splits the contents of a note section into records.
///
/// `base` is the section's file offset and only affects error reports.
/// `addralign` 8 selects 8-byte padding between fields (as used by
/// `NT_GNU_PROPERTY_TYPE_0` on 64-bit targets); anything else selects 4.
///
/// # Errors
///
/// Returns [`ElfError::TruncatedInput`] if a record runs past the end of
/// the section.
pub fn parse_notes(
    section: &str,
    data: &[u8],
    base: u64,
    addralign: u64,
    order: Endianness,
) -> Result<Vec<Note>, ElfError> {
    let align = if addralign == 8 { 8 } else { 4 };
    let header = size_of::<ElfNhdr>();
    let truncated = |offset: usize, len: usize| ElfError::TruncatedInput {
        what: "note",
        offset: base + offset as u64,
        len: len as u64,
        available: data.len() as u64,
    };

    let mut notes = Vec::new();
    let mut offset = 0;
    while offset < data.len() {
        let nhdr = ElfNhdr::read_at(data, offset).ok_or_else(|| truncated(offset, header))?;
        let namesz = nhdr.n_namesz.get(order) as usize;
        let descsz = nhdr.n_descsz.get(order) as usize;

        let name_off = offset + header;
        let name = data
            .get(name_off..name_off.saturating_add(namesz))
            .ok_or_else(|| truncated(name_off, namesz))?;
        let desc_off =
            align_up(name_off + namesz, align).ok_or_else(|| truncated(name_off, namesz))?;
        let desc = data
            .get(desc_off..desc_off.saturating_add(descsz))
            .ok_or_else(|| truncated(desc_off, descsz))?;

        let end = name.iter().position(|&b| b == 0).unwrap_or(name.len());
        notes.push(Note {
            section: section.to_owned(),
            name: String::from_utf8_lossy(&name[..end]).into_owned(),
            kind: nhdr.n_type.get(order),
            desc: desc.to_vec(),
        });

        offset = match align_up(desc_off + descsz, align) {
            Some(next) => next,
            None => break,
        };
    }
    Ok(notes)
}
