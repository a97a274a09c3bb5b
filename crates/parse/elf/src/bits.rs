//! Packed-field helpers.
//!
//! Several ELF fields pack two values into one integer (symbol binding and
//! type in `st_info`, symbol index and relocation type in `r_info`, and so
//! on). These functions split and combine them. They are total: any input
//! value produces a result, and out-of-range parts are truncated to their
//! field width.

/// Upper bound of the `DT_VALRNGLO..=DT_VALRNGHI` tag range.
pub const DT_VALRNGHI: i64 = 0x6fff_fdff;
/// Upper bound of the `DT_ADDRRNGLO..=DT_ADDRRNGHI` tag range.
pub const DT_ADDRRNGHI: i64 = 0x6fff_feff;
/// Last of the GNU symbol-versioning dynamic tags.
pub const DT_VERNEEDNUM: i64 = 0x6fff_ffff;
/// Mask of the ARM EABI version in `e_flags`.
pub const EF_ARM_EABIMASK: u32 = 0xff00_0000;

/// Symbol binding: the high nibble of `st_info`.
#[must_use]
pub const fn st_bind(info: u8) -> u8 {
    info >> 4
}

/// Symbol type: the low nibble of `st_info`.
#[must_use]
pub const fn st_type(info: u8) -> u8 {
    info & 0xf
}

/// Packs a binding and type into `st_info`.
#[must_use]
pub const fn st_info(bind: u8, kind: u8) -> u8 {
    (bind << 4) | (kind & 0xf)
}

/// Symbol visibility: the low two bits of `st_other`.
#[must_use]
pub const fn st_visibility(other: u8) -> u8 {
    other & 0x3
}

/// Symbol index of an ELF32 `r_info`.
#[must_use]
pub const fn r32_sym(info: u32) -> u32 {
    info >> 8
}

/// Relocation type of an ELF32 `r_info`.
#[must_use]
pub const fn r32_type(info: u32) -> u32 {
    info & 0xff
}

/// Packs a symbol index and relocation type into an ELF32 `r_info`.
#[must_use]
pub const fn r32_info(sym: u32, kind: u32) -> u32 {
    (sym << 8) | (kind & 0xff)
}

/// Symbol index of an ELF64 `r_info`.
#[must_use]
#[expect(clippy::cast_possible_truncation, reason = "the index is the high 32 bits")]
pub const fn r64_sym(info: u64) -> u32 {
    (info >> 32) as u32
}

/// Relocation type of an ELF64 `r_info`.
#[must_use]
#[expect(
    clippy::cast_possible_truncation,
    reason = "the type is the low 32 bits of r_info"
)]
pub const fn r64_type(info: u64) -> u32 {
    info as u32
}

/// Packs a symbol index and relocation type into an ELF64 `r_info`.
#[must_use]
#[expect(clippy::cast_lossless, reason = "`From` is not usable in const fn")]
pub const fn r64_info(sym: u32, kind: u32) -> u64 {
    ((sym as u64) << 32) | kind as u64
}

/// Symbol index of an ELF32 `m_info`.
#[must_use]
pub const fn m32_sym(info: u32) -> u32 {
    info >> 8
}

/// Move-record size of an ELF32 `m_info`.
#[must_use]
#[expect(clippy::cast_possible_truncation, reason = "the size is the low byte")]
pub const fn m32_size(info: u32) -> u8 {
    info as u8
}

/// Packs a symbol index and size into an ELF32 `m_info`.
#[must_use]
#[expect(clippy::cast_lossless, reason = "`From` is not usable in const fn")]
pub const fn m32_info(sym: u32, size: u8) -> u32 {
    (sym << 8) | size as u32
}

/// Symbol index of an ELF64 `m_info`.
#[must_use]
pub const fn m64_sym(info: u64) -> u64 {
    info >> 8
}

/// Move-record size of an ELF64 `m_info`.
#[must_use]
#[expect(clippy::cast_possible_truncation, reason = "the size is the low byte")]
pub const fn m64_size(info: u64) -> u8 {
    info as u8
}

/// Packs a symbol index and size into an ELF64 `m_info`.
#[must_use]
#[expect(clippy::cast_lossless, reason = "`From` is not usable in const fn")]
pub const fn m64_info(sym: u64, size: u8) -> u64 {
    (sym << 8) | size as u64
}

/// Index of a tag within the value-range dynamic tags.
#[must_use]
pub const fn dt_valtagidx(tag: i64) -> i64 {
    DT_VALRNGHI.wrapping_sub(tag)
}

/// Index of a tag within the address-range dynamic tags.
#[must_use]
pub const fn dt_addrtagidx(tag: i64) -> i64 {
    DT_ADDRRNGHI.wrapping_sub(tag)
}

/// Index of a tag within the symbol-versioning dynamic tags.
#[must_use]
pub const fn dt_versiontagidx(tag: i64) -> i64 {
    DT_VERNEEDNUM.wrapping_sub(tag)
}

/// Index of a tag within the `DT_AUXILIARY`/`DT_FILTER` extra tags.
///
/// Works on the low 32 bits of the tag: bit 31 is dropped, the value is
/// sign-extended from bit 30, negated and decremented.
#[must_use]
#[expect(clippy::cast_possible_truncation, reason = "tags are 32-bit words")]
#[expect(clippy::cast_sign_loss, reason = "result is an unsigned word")]
pub const fn dt_extratagidx(tag: i64) -> u32 {
    let folded = ((tag as i32).wrapping_shl(1)) >> 1;
    (folded.wrapping_neg() as u32).wrapping_sub(1)
}

/// ARM EABI version encoded in the top byte of `e_flags`.
#[must_use]
pub const fn ef_arm_eabi_version(flags: u32) -> u32 {
    flags & EF_ARM_EABIMASK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn st_info_splits_and_packs() {
        // STB_GLOBAL | STT_FUNC
        assert_eq!(st_bind(0x12), 1);
        assert_eq!(st_type(0x12), 2);
        assert_eq!(st_info(1, 2), 0x12);
        for info in 0..=u8::MAX {
            assert_eq!(st_info(st_bind(info), st_type(info)), info);
        }
    }

    #[test]
    fn st_info_truncates_wide_type() {
        assert_eq!(st_info(2, 0x1f), 0x2f);
    }

    #[test]
    fn visibility_masks_two_bits() {
        assert_eq!(st_visibility(0xff), 3);
        assert_eq!(st_visibility(0x02), 2);
    }

    #[test]
    fn r32_fields() {
        assert_eq!(r32_sym(0x0000_0507), 5);
        assert_eq!(r32_type(0x0000_0507), 7);
        assert_eq!(r32_info(5, 7), 0x0507);
        assert_eq!(r32_info(r32_sym(0xdead_beef), r32_type(0xdead_beef)), 0xdead_beef);
    }

    #[test]
    fn r64_fields() {
        let info = 0x0000_0003_0000_0007;
        assert_eq!(r64_sym(info), 3);
        assert_eq!(r64_type(info), 7);
        assert_eq!(r64_info(3, 7), info);
        assert_eq!(r64_info(u32::MAX, u32::MAX), u64::MAX);
    }

    #[test]
    fn move_info_fields() {
        assert_eq!(m32_sym(0x1234_5608), 0x12_3456);
        assert_eq!(m32_size(0x1234_5608), 8);
        assert_eq!(m32_info(0x12_3456, 8), 0x1234_5608);
        assert_eq!(m64_sym(0xffff_0000_0000_0110), 0x00ff_ff00_0000_0001);
        assert_eq!(m64_size(0x0110), 0x10);
        assert_eq!(m64_info(1, 0x10), 0x0110);
    }

    #[test]
    fn dynamic_tag_indices() {
        assert_eq!(dt_valtagidx(DT_VALRNGHI), 0);
        // DT_GNU_PRELINKED
        assert_eq!(dt_valtagidx(0x6fff_fdf5), 10);
        // DT_GNU_HASH
        assert_eq!(dt_addrtagidx(0x6fff_fef5), 10);
        // DT_VERSYM
        assert_eq!(dt_versiontagidx(0x6fff_fff0), 15);
        assert_eq!(dt_versiontagidx(DT_VERNEEDNUM), 0);
    }

    #[test]
    fn extra_tag_indices() {
        // DT_FILTER and DT_AUXILIARY
        assert_eq!(dt_extratagidx(0x7fff_ffff), 0);
        assert_eq!(dt_extratagidx(0x7fff_fffd), 2);
    }

    #[test]
    fn arm_eabi_version() {
        assert_eq!(ef_arm_eabi_version(0x0500_0400), 0x0500_0000);
        assert_eq!(ef_arm_eabi_version(0x0000_0002), 0);
    }
}
