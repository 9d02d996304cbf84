use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::decoder::Instruction;
use crate::symbol::SymbolTable;

/// Output of assembly: the instruction sequence indexed by program counter,
/// plus the instruction and data label tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    insns: Vec<Instruction>,
    labels: SymbolTable,
    data_labels: SymbolTable,
    data: Range<u32>,
}

impl Program {
    pub(crate) fn new(
        insns: Vec<Instruction>,
        labels: SymbolTable,
        data_labels: SymbolTable,
        data: Range<u32>,
    ) -> Self {
        Self {
            insns,
            labels,
            data_labels,
            data,
        }
    }

    pub fn len(&self) -> usize {
        self.insns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.insns.is_empty()
    }

    pub fn get(&self, index: u32) -> Option<&Instruction> {
        self.insns.get(index as usize)
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.insns
    }

    /// Instruction labels (name to program index).
    pub fn labels(&self) -> &SymbolTable {
        &self.labels
    }

    /// Data labels (name to byte address).
    pub fn data_labels(&self) -> &SymbolTable {
        &self.data_labels
    }

    /// Addresses covered by data directives: from the data base to the final cursor.
    pub fn data_range(&self) -> Range<u32> {
        self.data.clone()
    }
}
