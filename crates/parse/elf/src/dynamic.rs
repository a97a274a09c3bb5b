//! Dynamic section entries.

use crate::types::DynamicTag;

/// One `.dynamic` entry. The `d_un` union is kept as a single widened word
/// and exposed through both of its member names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DynamicEntry {
    /// The entry's tag.
    pub tag: DynamicTag,
    value: u64,
}

impl DynamicEntry {
    /// Builds an entry from a sign-extended `d_tag` and widened `d_un`.
    #[must_use]
    pub fn new(d_tag: i64, d_un: u64) -> Self {
        Self {
            tag: DynamicTag::from_raw(d_tag),
            value: d_un,
        }
    }

    /// Raw `d_tag`.
    #[must_use]
    pub fn d_tag(&self) -> i64 {
        self.tag.raw()
    }

    /// `d_un` read as an integer value.
    #[must_use]
    pub fn d_val(&self) -> u64 {
        self.value
    }

    /// `d_un` read as an address.
    #[must_use]
    pub fn d_ptr(&self) -> u64 {
        self.value
    }
}
