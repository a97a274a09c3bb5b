//! Symbol table entries.

use crate::bits;
use crate::types::{SymbolBinding, SymbolType, SymbolVisibility};

/// Which symbol table an entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolTable {
    /// `.symtab`, resolved against `.strtab`.
    Static,
    /// `.dynsym`, resolved against `.dynstr`.
    Dynamic,
}

/// A symbol table entry with every field widened to its 64-bit form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolRecord {
    /// Offset of the name in the linked string table.
    pub st_name: u32,
    /// Packed binding and type.
    pub st_info: u8,
    /// Packed visibility.
    pub st_other: u8,
    /// Index of the section the symbol is defined in.
    pub st_shndx: u16,
    /// Symbol value (address for defined symbols).
    pub st_value: u64,
    /// Symbol size in bytes.
    pub st_size: u64,
}

/// A decoded symbol with its name resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    /// The table the symbol belongs to.
    pub table: SymbolTable,
    /// Position within that table.
    pub index: usize,
    /// Resolved name.
    pub name: String,
    /// Symbol value.
    pub value: u64,
    /// Symbol size in bytes.
    pub size: u64,
    /// Binding, from the high nibble of `st_info`.
    pub binding: SymbolBinding,
    /// Type, from the low nibble of `st_info`.
    pub kind: SymbolType,
    /// Visibility, from `st_other`.
    pub visibility: SymbolVisibility,
    /// Section index (`SHN_UNDEF` for undefined symbols).
    pub shndx: u16,
}

impl Symbol {
    pub(crate) fn new(table: SymbolTable, index: usize, name: String, raw: &SymbolRecord) -> Self {
        Self {
            table,
            index,
            name,
            value: raw.st_value,
            size: raw.st_size,
            binding: SymbolBinding::from_raw(bits::st_bind(raw.st_info)),
            kind: SymbolType::from_raw(bits::st_type(raw.st_info)),
            visibility: SymbolVisibility::from_raw(bits::st_visibility(raw.st_other)),
            shndx: raw.st_shndx,
        }
    }

    /// Returns `true` if the symbol is not defined in this file.
    #[must_use]
    pub fn is_undefined(&self) -> bool {
        self.shndx == crate::types::SHN_UNDEF
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unpacks_info_and_other() {
        let raw = SymbolRecord {
            st_name: 1,
            st_info: bits::st_info(2, 2),
            st_other: 0xf2,
            st_shndx: 0,
            st_value: 0,
            st_size: 0,
        };
        let sym = Symbol::new(SymbolTable::Dynamic, 3, String::from("puts"), &raw);
        assert_eq!(sym.binding, SymbolBinding::Weak);
        assert_eq!(sym.kind, SymbolType::Func);
        assert_eq!(sym.visibility, SymbolVisibility::Hidden);
        assert!(sym.is_undefined());
    }
}
