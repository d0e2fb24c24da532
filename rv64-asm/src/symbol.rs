//! Label bookkeeping for the two-phase parser.

use crate::{BuildError, BuildErrorKind};

use hashbrown::HashMap;

/// A named program location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    /// Label text, without the trailing colon.
    pub name: String,
    /// Byte offset from the start of the program.
    pub address: u64,
}

/// Label → address map built during the first parser pass.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: HashMap<String, Symbol>,
}

impl SymbolTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a label at the given byte offset. Re-defining a label fails
    /// and leaves the first definition authoritative.
    pub fn add_label(&mut self, name: &str, address: u64) -> Result<(), BuildError> {
        if self.symbols.contains_key(name) {
            return Err(BuildError::new(
                BuildErrorKind::DuplicateLabel,
                format!("duplicate label '{name}'"),
            ));
        }
        self.symbols.insert(
            name.to_owned(),
            Symbol {
                name: name.to_owned(),
                address,
            },
        );
        Ok(())
    }

    /// Look up a label's byte offset.
    pub fn address_of(&self, name: &str) -> Option<u64> {
        self.symbols.get(name).map(|s| s.address)
    }

    /// Number of recorded labels.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Whether no labels were recorded.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Flatten into a name → absolute-address map, rebasing every entry by
    /// `base` (the address the program is loaded at).
    pub fn export(&self, base: u64) -> HashMap<String, u64> {
        self.symbols
            .iter()
            .map(|(name, sym)| (name.clone(), sym.address.wrapping_add(base)))
            .collect()
    }

    /// Drop all entries.
    pub fn clear(&mut self) {
        self.symbols.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_label_keeps_first() {
        let mut table = SymbolTable::new();
        table.add_label("loop", 4).unwrap();
        let err = table.add_label("loop", 12).unwrap_err();
        assert_eq!(err.kind, BuildErrorKind::DuplicateLabel);
        assert_eq!(table.address_of("loop"), Some(4));
    }

    #[test]
    fn export_rebases() {
        let mut table = SymbolTable::new();
        table.add_label("start", 0).unwrap();
        table.add_label("end", 16).unwrap();
        let map = table.export(0x40_0000);
        assert_eq!(map["start"], 0x40_0000);
        assert_eq!(map["end"], 0x40_0010);
    }
}
