//! Line-oriented assembler.
//!
//! A single forward pass over the source, switched between `.text` and `.data`
//! sections. Text lines are decoded into [`Instruction`]s; data directives write
//! straight into the machine's memory. Branch labels are stored by name and
//! resolved at execution time, so forward references need no second pass.
//!
//! Problems with individual lines are never fatal: the line is skipped and a
//! `tracing` diagnostic is emitted.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::decoder::{parse_int, parse_word, DecodeError, Decoder, Instruction};
use crate::isa::rv32::Rv32Decoder;
use crate::memory::Bus;
use crate::program::Program;
use crate::symbol::SymbolTable;

/// First address written by `.data` directives unless configured otherwise.
pub const DEFAULT_DATA_BASE: u32 = 32;

const COMMENT_CHAR: char = '#';
const LABEL_SUFFIX: char = ':';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsmConfig {
    pub data_base: u32,
}

impl Default for AsmConfig {
    fn default() -> Self {
        Self {
            data_base: DEFAULT_DATA_BASE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Text,
    Data,
}

pub struct Assembler<D: Decoder = Rv32Decoder> {
    dec: D,
    cfg: AsmConfig,
}

impl Assembler<Rv32Decoder> {
    pub fn new(cfg: AsmConfig) -> Self {
        Self::with_decoder(Rv32Decoder::new(), cfg)
    }
}

/// Mutable state of one assembly pass.
struct Pass {
    section: Section,
    insns: Vec<Instruction>,
    labels: SymbolTable,
    data_labels: SymbolTable,
    cursor: u32,
}

impl Pass {
    fn bind_code_label(&mut self, name: &str, line: usize) {
        let index = self.insns.len() as u32;
        if let Some(old) = self.labels.define(name, index) {
            warn!(line, label = name, old, new = index, "instruction label redefined");
        }
    }

    fn bind_data_label(&mut self, name: &str, line: usize) {
        if let Some(old) = self.data_labels.define(name, self.cursor) {
            warn!(line, label = name, old, new = self.cursor, "data label redefined");
        }
    }
}

impl<D: Decoder> Assembler<D> {
    pub fn with_decoder(dec: D, cfg: AsmConfig) -> Self {
        Self { dec, cfg }
    }

    /// Assembles `source`, writing initialised data into `bus`.
    pub fn assemble<B: Bus>(&self, source: &str, bus: &mut B) -> Program {
        let mut pass = Pass {
            section: Section::Data,
            insns: Vec::new(),
            labels: SymbolTable::new(),
            data_labels: SymbolTable::new(),
            cursor: self.cfg.data_base,
        };

        for (n, raw) in source.lines().enumerate() {
            let line_no = n + 1;
            let Some(line) = clean(raw) else { continue };
            match line {
                ".text" => pass.section = Section::Text,
                ".data" => pass.section = Section::Data,
                _ => match pass.section {
                    Section::Text => self.text_line(&mut pass, line, line_no),
                    Section::Data => data_line(&mut pass, line, line_no, bus),
                },
            }
        }

        debug!(
            instructions = pass.insns.len(),
            labels = pass.labels.len(),
            data_labels = pass.data_labels.len(),
            "assembled program"
        );
        Program::new(
            pass.insns,
            pass.labels,
            pass.data_labels,
            self.cfg.data_base..pass.cursor,
        )
    }

    fn text_line(&self, pass: &mut Pass, line: &str, line_no: usize) {
        if let Some(name) = line.strip_suffix(LABEL_SUFFIX) {
            pass.bind_code_label(name.trim(), line_no);
            return;
        }

        let decoded = self.dec.decode(line);
        if let Some(name) = &decoded.label {
            pass.bind_code_label(name, line_no);
        }
        match decoded.insn {
            Ok(Some(insn)) => pass.insns.push(insn),
            Ok(None) => {}
            Err(e @ DecodeError::UnknownMnemonic(_)) => {
                debug!(line = line_no, "ignoring `{line}`: {e}")
            }
            Err(e) => warn!(line = line_no, "skipping `{line}`: {e}"),
        }
    }
}

fn data_line<B: Bus>(pass: &mut Pass, line: &str, line_no: usize, bus: &mut B) {
    if let Some(name) = line.strip_suffix(LABEL_SUFFIX) {
        pass.bind_data_label(name.trim(), line_no);
        return;
    }

    let mut rest = line;
    if let Some((head, tail)) = line.split_once(LABEL_SUFFIX) {
        let head = head.trim();
        if !head.is_empty() && !head.contains(char::is_whitespace) {
            pass.bind_data_label(head, line_no);
            rest = tail.trim();
        }
    }

    let (directive, args) = rest
        .split_once(char::is_whitespace)
        .map(|(d, a)| (d, a.trim()))
        .unwrap_or((rest, ""));
    match directive {
        ".word" => word_directive(pass, args, line_no, bus),
        ".align" => align_directive(pass, args, line_no),
        _ => warn!(line = line_no, "unrecognized data directive: {rest}"),
    }
}

fn word_directive<B: Bus>(pass: &mut Pass, args: &str, line_no: usize, bus: &mut B) {
    let values = args
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty());
    for tok in values {
        let Some(value) = parse_word(tok) else {
            warn!(line = line_no, "invalid .word value `{tok}`, ignoring rest of directive");
            return;
        };
        if let Err(e) = bus.write_u32(pass.cursor, value as u32) {
            warn!(line = line_no, "store out of range: {e}");
        }
        pass.cursor = pass.cursor.wrapping_add(4);
    }
}

fn align_directive(pass: &mut Pass, args: &str, line_no: usize) {
    let exp = match parse_int::<i64>(args) {
        Some(n @ 0..=31) => n as u32,
        _ => {
            warn!(line = line_no, "invalid .align exponent `{args}`");
            return;
        }
    };
    let boundary = 1u64 << exp;
    let aligned = (pass.cursor as u64 + boundary - 1) & !(boundary - 1);
    match u32::try_from(aligned) {
        Ok(cursor) => pass.cursor = cursor,
        Err(_) => warn!(
            line = line_no,
            cursor = pass.cursor,
            "`.align {exp}` moves the data cursor past the address space"
        ),
    }
}

/// Strips the comment and surrounding whitespace; `None` for blank lines.
fn clean(raw: &str) -> Option<&str> {
    let code = match raw.find(COMMENT_CHAR) {
        Some(pos) => &raw[..pos],
        None => raw,
    };
    let code = code.trim();
    (!code.is_empty()).then_some(code)
}
