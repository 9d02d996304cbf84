use std::fmt;

use num_traits::{CheckedNeg, Num};
use serde::{Deserialize, Serialize};

/// Number of architectural integer registers (x0..x31).
pub const NUM_REGS: usize = 32;

/// Register identifier, resolved from its textual `xN` form once at assembly time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8")]
pub struct Reg(u8);

impl TryFrom<u8> for Reg {
    type Error = String;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Reg::new(index).ok_or_else(|| format!("register index {index} out of range"))
    }
}

impl Reg {
    /// Hard-wired zero register.
    pub const ZERO: Reg = Reg(0);

    pub fn new(index: u8) -> Option<Self> {
        ((index as usize) < NUM_REGS).then_some(Reg(index))
    }

    /// Parses `x0`..`x31`. Anything else is rejected.
    pub fn parse(s: &str) -> Option<Self> {
        let digits = s.strip_prefix('x')?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse::<u8>().ok().and_then(Reg::new)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Op {
    Addi,
    Add,
    Sub,
    Mul,
    Sll,
    Slli,
    Lw,
    Sw,
    Beq,
    Bne,
    Ecall,
}

impl Op {
    pub fn mnemonic(self) -> &'static str {
        match self {
            Op::Addi => "addi",
            Op::Add => "add",
            Op::Sub => "sub",
            Op::Mul => "mul",
            Op::Sll => "sll",
            Op::Slli => "slli",
            Op::Lw => "lw",
            Op::Sw => "sw",
            Op::Beq => "beq",
            Op::Bne => "bne",
            Op::Ecall => "ecall",
        }
    }

    pub fn is_branch(self) -> bool {
        matches!(self, Op::Beq | Op::Bne)
    }
}

/// One decoded source line. Immutable once stored in a [`Program`](crate::Program).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub op: Op,
    pub rd: Option<Reg>,
    pub rs1: Option<Reg>,
    pub rs2: Option<Reg>,
    /// Offset, constant or shift amount depending on `op`.
    pub imm: i32,
    /// Branch target written as a label; resolved at execution time.
    pub target: Option<String>,
    /// Label defined on the same source line.
    pub label: Option<String>,
}

impl Instruction {
    pub fn new(op: Op) -> Self {
        Self {
            op,
            rd: None,
            rs1: None,
            rs2: None,
            imm: 0,
            target: None,
            label: None,
        }
    }

    pub fn rd(mut self, r: Reg) -> Self {
        self.rd = Some(r);
        self
    }

    pub fn rs1(mut self, r: Reg) -> Self {
        self.rs1 = Some(r);
        self
    }

    pub fn rs2(mut self, r: Reg) -> Self {
        self.rs2 = Some(r);
        self
    }

    pub fn imm(mut self, imm: i32) -> Self {
        self.imm = imm;
        self
    }

    pub fn target(mut self, label: impl Into<String>) -> Self {
        self.target = Some(label.into());
        self
    }
}

/// Why a text line did not produce an instruction.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unknown mnemonic `{0}`")]
    UnknownMnemonic(String),
    #[error("`{mnemonic}` expects operands `{expected}`")]
    Operands {
        mnemonic: String,
        expected: &'static str,
    },
    #[error("invalid register `{0}`")]
    BadRegister(String),
    #[error("invalid immediate `{0}`")]
    BadImmediate(String),
    #[error("invalid memory operand `{0}`, expected offset(reg)")]
    BadMemOperand(String),
}

/// Result of decoding one text-mode line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    /// Label prefixed to the line (`loop: addi ...`), if any.
    pub label: Option<String>,
    /// `Ok(None)` for a line carrying only a label.
    pub insn: Result<Option<Instruction>, DecodeError>,
}

pub trait Decoder {
    fn decode(&self, line: &str) -> Decoded;
}

/// Parses a decimal or `0x` hex integer with an optional leading sign.
pub fn parse_int<T>(s: &str) -> Option<T>
where
    T: Num + CheckedNeg,
{
    let s = s.trim();
    let (neg, rest) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let (digits, radix) = match rest.strip_prefix("0x").or_else(|| rest.strip_prefix("0X")) {
        Some(hex) => (hex, 16),
        None => (rest, 10),
    };
    // from_str_radix takes its own sign; only one is allowed, before any prefix.
    if digits.starts_with(['+', '-']) {
        return None;
    }
    let v = T::from_str_radix(digits, radix).ok()?;
    if neg {
        v.checked_neg()
    } else {
        Some(v)
    }
}

/// Parses a 32-bit word: anything in `i32::MIN..=u32::MAX`, kept bit-for-bit.
pub fn parse_word(s: &str) -> Option<i32> {
    let v = parse_int::<i64>(s)?;
    if v < i32::MIN as i64 || v > u32::MAX as i64 {
        return None;
    }
    Some(v as u32 as i32)
}
