//! Decoder configuration.
//!
//! A [`DecodeConfig`] is passed explicitly to each session. It can be built
//! in code or loaded from TOML:
//!
//! ```toml
//! backing = "lazy"
//! static_zero_symbols = "include"
//! strict_entry_sizes = true
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::ElfError;

/// How [`Session::open`](crate::Session::open) accesses the file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backing {
    /// Read the whole file into memory up front.
    #[default]
    Eager,
    /// Seek and read each structure on demand.
    Lazy,
}

/// Whether symbols with a value of zero enter an address map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZeroSymbolPolicy {
    /// Leave them out.
    Exclude,
    /// Keep them.
    Include,
}

/// Options controlling how an image is decoded.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecodeConfig {
    /// Backing used by [`Session::open`](crate::Session::open).
    pub backing: Backing,
    /// Zero-valued entries of `.symtab`. Excluded by default.
    pub static_zero_symbols: ZeroSymbolPolicy,
    /// Zero-valued entries of `.dynsym`. Included by default.
    pub dynamic_zero_symbols: ZeroSymbolPolicy,
    /// Treat an entry size smaller than the record as an error instead of
    /// a warning.
    pub strict_entry_sizes: bool,
    /// Resolve the symbol name referenced by each relocation.
    pub resolve_relocation_names: bool,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            backing: Backing::Eager,
            static_zero_symbols: ZeroSymbolPolicy::Exclude,
            dynamic_zero_symbols: ZeroSymbolPolicy::Include,
            strict_entry_sizes: false,
            resolve_relocation_names: true,
        }
    }
}

impl DecodeConfig {
    /// Parses a configuration from TOML. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::Config`] for malformed TOML, unknown keys or
    /// unknown values.
    pub fn from_toml_str(text: &str) -> Result<Self, ElfError> {
        toml::from_str(text).map_err(|err| ElfError::Config(err.to_string()))
    }

    /// Loads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::Io`] if the file cannot be read, or
    /// [`ElfError::Config`] if it does not parse.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ElfError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn empty_document_is_default() {
        assert_eq!(DecodeConfig::from_toml_str("").unwrap(), DecodeConfig::default());
    }

    #[test]
    fn parse_all_keys() {
        let cfg = DecodeConfig::from_toml_str(
            r#"
            backing = "lazy"
            static_zero_symbols = "include"
            dynamic_zero_symbols = "exclude"
            strict_entry_sizes = true
            resolve_relocation_names = false
            "#,
        )
        .unwrap();
        assert_eq!(cfg.backing, Backing::Lazy);
        assert_eq!(cfg.static_zero_symbols, ZeroSymbolPolicy::Include);
        assert_eq!(cfg.dynamic_zero_symbols, ZeroSymbolPolicy::Exclude);
        assert!(cfg.strict_entry_sizes);
        assert!(!cfg.resolve_relocation_names);
    }

    #[test]
    fn rejects_unknown_keys_and_values() {
        let err = DecodeConfig::from_toml_str("bits = 32").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        let err = DecodeConfig::from_toml_str("backing = \"mmap\"").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }
}
