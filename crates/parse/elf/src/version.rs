//! GNU symbol versioning: `.gnu.version_d` and `.gnu.version_r`.

use kestrel_binparse::{Endianness, FromBytes};

use crate::error::ElfError;
use crate::raw::{ElfVerdaux, ElfVerdef, ElfVernaux, ElfVerneed};
use crate::section::StringTable;

/// `VER_FLG_BASE`: the definition names the object itself.
pub const VER_FLG_BASE: u16 = 0x1;
/// `VER_FLG_WEAK`: a weak version reference.
pub const VER_FLG_WEAK: u16 = 0x2;

/// One entry of `.gnu.version_d`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionDefinition {
    /// `vd_version`, normally 1.
    pub version: u16,
    /// `VER_FLG_*` bits.
    pub flags: u16,
    /// Version index referenced from `.gnu.version`.
    pub index: u16,
    /// ELF hash of the first name.
    pub hash: u32,
    /// The version name followed by the names of its predecessors.
    pub names: Vec<String>,
}

impl VersionDefinition {
    /// The version's own name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.names.first().map(String::as_str)
    }
}

/// One file entry of `.gnu.version_r`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionNeed {
    /// `vn_version`, normally 1.
    pub version: u16,
    /// Name of the library the versions are needed from.
    pub file: String,
    /// The versions needed from that file.
    pub entries: Vec<VersionNeedEntry>,
}

/// One version needed from a library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionNeedEntry {
    /// ELF hash of the name.
    pub hash: u32,
    /// `VER_FLG_*` bits.
    pub flags: u16,
    /// Version index assigned to this requirement.
    pub other: u16,
    /// Version name, e.g. `GLIBC_2.34`.
    pub name: String,
}

/// Reads one record at `offset` within a versioning section.
fn record_at<T: FromBytes>(
    data: &[u8],
    offset: u64,
    base: u64,
    what: &'static str,
) -> Result<T, ElfError> {
    let truncated = || ElfError::TruncatedInput {
        what,
        offset: base.wrapping_add(offset),
        len: size_of::<T>() as u64,
        available: data.len() as u64,
    };
    let start = usize::try_from(offset).map_err(|_| truncated())?;
    T::read_at(data, start).ok_or_else(truncated)
}

/// Walks the `vd_next`/`vda_next` chains of a `.gnu.version_d` section.
///
/// `count` is the section's `sh_info`. `base` is its file offset and only
/// affects error reports.
///
/// # Errors
///
/// Returns [`ElfError::TruncatedInput`] if a chain leaves the section, or
/// [`ElfError::UnresolvedReference`] if a name lies outside `strtab`.
pub fn parse_definitions(
    data: &[u8],
    base: u64,
    count: u32,
    order: Endianness,
    strtab: &StringTable,
) -> Result<Vec<VersionDefinition>, ElfError> {
    let mut defs = Vec::new();
    let mut offset = 0u64;
    for _ in 0..count {
        let vd: ElfVerdef = record_at(data, offset, base, "version definition")?;
        let mut names = Vec::new();
        let mut aux = offset + u64::from(vd.vd_aux.get(order));
        for _ in 0..vd.vd_cnt.get(order) {
            let vda: ElfVerdaux = record_at(data, aux, base, "version definition name")?;
            names.push(strtab.resolve(vda.vda_name.get(order), "version name")?);
            aux += u64::from(vda.vda_next.get(order));
        }
        defs.push(VersionDefinition {
            version: vd.vd_version.get(order),
            flags: vd.vd_flags.get(order),
            index: vd.vd_ndx.get(order),
            hash: vd.vd_hash.get(order),
            names,
        });
        match vd.vd_next.get(order) {
            0 => break,
            next => offset += u64::from(next),
        }
    }
    Ok(defs)
}

/// Walks the `vn_next`/`vna_next` chains of a `.gnu.version_r` section.
///
/// # Errors
///
/// As for [`parse_definitions`].
pub fn parse_needs(
    data: &[u8],
    base: u64,
    count: u32,
    order: Endianness,
    strtab: &StringTable,
) -> Result<Vec<VersionNeed>, ElfError> {
    let mut needs = Vec::new();
    let mut offset = 0u64;
    for _ in 0..count {
        let vn: ElfVerneed = record_at(data, offset, base, "version requirement")?;
        let mut entries = Vec::new();
        let mut aux = offset + u64::from(vn.vn_aux.get(order));
        for _ in 0..vn.vn_cnt.get(order) {
            let vna: ElfVernaux = record_at(data, aux, base, "version requirement entry")?;
            entries.push(VersionNeedEntry {
                hash: vna.vna_hash.get(order),
                flags: vna.vna_flags.get(order),
                other: vna.vna_other.get(order),
                name: strtab.resolve(vna.vna_name.get(order), "version name")?,
            });
            aux += u64::from(vna.vna_next.get(order));
        }
        needs.push(VersionNeed {
            version: vn.vn_version.get(order),
            file: strtab.resolve(vn.vn_file.get(order), "version file name")?,
            entries,
        });
        match vn.vn_next.get(order) {
            0 => break,
            next => offset += u64::from(next),
        }
    }
    Ok(needs)
}
