use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

use rv32_sim::disasm::fmt_instruction;
use rv32_sim::{LinearMemory, Program, SimConfig, Simulator};

/// Assembles a source file into a fresh machine.
pub fn load_program(path: &Path, cfg: SimConfig) -> Result<Simulator> {
    let mut sim = Simulator::new(cfg);
    sim.load_file(path)
        .with_context(|| format!("assembling {}", path.display()))?;
    Ok(sim)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Line {
    pub index: u32,
    /// Every instruction label bound to this index.
    pub labels: Vec<String>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Symbol {
    pub name: String,
    pub value: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataWord {
    pub addr: u32,
    pub value: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Listing {
    pub instructions: Vec<Line>,
    pub labels: Vec<Symbol>,
    pub data_labels: Vec<Symbol>,
    /// Words between the data base and the final data cursor.
    pub data: Vec<DataWord>,
}

impl Listing {
    pub fn new(program: &Program, mem: &LinearMemory) -> Self {
        let instructions = program
            .instructions()
            .iter()
            .enumerate()
            .map(|(i, insn)| {
                let index = i as u32;
                let labels = program
                    .labels()
                    .iter()
                    .filter(|&(_, v)| v == index)
                    .map(|(name, _)| name.to_string())
                    .collect();
                Line {
                    index,
                    labels,
                    text: fmt_instruction(insn),
                }
            })
            .collect();

        let range = program.data_range();
        let len = range.end.saturating_sub(range.start);
        let data = mem
            .window(range.start, len)
            .into_iter()
            .map(|(addr, value)| DataWord { addr, value })
            .collect();

        Self {
            instructions,
            labels: symbols(program.labels()),
            data_labels: symbols(program.data_labels()),
            data,
        }
    }

    /// Labels bound past the last instruction (e.g. an `end:` at the bottom).
    pub fn trailing_labels(&self) -> impl Iterator<Item = &Symbol> {
        let len = self.instructions.len() as u32;
        self.labels.iter().filter(move |s| s.value >= len)
    }
}

fn symbols(table: &rv32_sim::SymbolTable) -> Vec<Symbol> {
    table
        .iter()
        .map(|(name, value)| Symbol {
            name: name.to_string(),
            value,
        })
        .collect()
}
