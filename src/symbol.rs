use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Label name to value binding. Used both for instruction labels
/// (value is a program index) and data labels (value is a byte address).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolTable {
    map: BTreeMap<String, u32>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name`, overwriting any earlier binding. Returns the old value.
    pub fn define(&mut self, name: impl Into<String>, value: u32) -> Option<u32> {
        self.map.insert(name.into(), value)
    }

    pub fn get(&self, name: &str) -> Option<u32> {
        self.map.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.map.iter().map(|(k, v)| (k.as_str(), *v))
    }
}
