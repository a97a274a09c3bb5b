//! Program headers and file-offset/virtual-address translation.

use crate::types::{SegmentFlags, SegmentType};

/// A program header with every field widened to its 64-bit form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramHeader {
    /// Segment type.
    pub p_type: u32,
    /// Segment permission flags.
    pub p_flags: u32,
    /// File offset of the segment data.
    pub p_offset: u64,
    /// Virtual address of the segment in memory.
    pub p_vaddr: u64,
    /// Physical address (unused on most platforms).
    pub p_paddr: u64,
    /// Size of the segment data in the file.
    pub p_filesz: u64,
    /// Size of the segment in memory (may be larger than `p_filesz` for BSS).
    pub p_memsz: u64,
    /// Required alignment.
    pub p_align: u64,
}

/// A segment with typed attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    /// Position in the program header table.
    pub index: usize,
    /// Segment type.
    pub kind: SegmentType,
    /// Permission flags.
    pub flags: SegmentFlags,
    /// The raw header.
    pub header: ProgramHeader,
}

impl Segment {
    /// Returns `true` for `PT_LOAD` segments.
    #[must_use]
    pub fn is_load(&self) -> bool {
        self.kind == SegmentType::Load
    }

    /// Returns `true` if `offset` lies in `[p_offset, p_offset + p_filesz]`.
    ///
    /// The end bound is inclusive so that the one-past-the-end offset of a
    /// segment still maps to its one-past-the-end address.
    #[must_use]
    pub fn contains_offset(&self, offset: u64) -> bool {
        let h = &self.header;
        offset >= h.p_offset && offset - h.p_offset <= h.p_filesz
    }

    /// Returns `true` if `address` lies in `[p_vaddr, p_vaddr + p_memsz]`.
    #[must_use]
    pub fn contains_address(&self, address: u64) -> bool {
        let h = &self.header;
        address >= h.p_vaddr && address - h.p_vaddr <= h.p_memsz
    }

    /// Translates a file offset inside this segment to a virtual address.
    #[must_use]
    pub fn offset_to_address(&self, offset: u64) -> Option<u64> {
        self.contains_offset(offset)
            .then(|| self.header.p_vaddr.wrapping_add(offset - self.header.p_offset))
    }

    /// Translates a virtual address inside this segment to a file offset.
    #[must_use]
    pub fn address_to_offset(&self, address: u64) -> Option<u64> {
        self.contains_address(address)
            .then(|| self.header.p_offset.wrapping_add(address - self.header.p_vaddr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(p_offset: u64, p_filesz: u64, p_vaddr: u64, p_memsz: u64) -> Segment {
        Segment {
            index: 0,
            kind: SegmentType::Load,
            flags: SegmentFlags::R | SegmentFlags::X,
            header: ProgramHeader {
                p_type: 1,
                p_flags: 5,
                p_offset,
                p_vaddr,
                p_paddr: p_vaddr,
                p_filesz,
                p_memsz,
                p_align: 0x1000,
            },
        }
    }

    #[test]
    fn translate_inside_segment() {
        let seg = load(0x1000, 0x200, 0x2000, 0x200);
        assert_eq!(seg.offset_to_address(0x1050), Some(0x2050));
        assert_eq!(seg.address_to_offset(0x2050), Some(0x1050));
    }

    #[test]
    fn bounds_are_inclusive() {
        let seg = load(0x1000, 0x200, 0x2000, 0x200);
        assert_eq!(seg.offset_to_address(0x1200), Some(0x2200));
        assert_eq!(seg.offset_to_address(0x1201), None);
        assert_eq!(seg.offset_to_address(0x0fff), None);
    }

    #[test]
    fn bss_tail_has_address_but_no_offset_mapping_back() {
        // Memory image larger than file image: addresses past p_filesz
        // still translate to offsets (past the file data).
        let seg = load(0x1000, 0x100, 0x2000, 0x400);
        assert_eq!(seg.address_to_offset(0x2300), Some(0x1300));
        assert_eq!(seg.offset_to_address(0x1300), None);
    }

    #[test]
    fn extreme_values_do_not_overflow() {
        let seg = load(u64::MAX - 0x10, 0x10, u64::MAX - 0x10, 0x10);
        assert_eq!(seg.offset_to_address(u64::MAX), Some(u64::MAX));
        assert_eq!(seg.address_to_offset(0), None);
    }
}
