use crate::decoder::{parse_word, DecodeError, Decoded, Decoder, Instruction, Op, Reg};
use crate::instructions::{lookup, Form};

/// Text decoder for the RV32 subset: `addi add sub mul sll lw sw li beq bne ecall`.
/// Operands may be separated by commas, whitespace, or both.
#[derive(Debug, Default, Clone, Copy)]
pub struct Rv32Decoder;

impl Rv32Decoder {
    pub fn new() -> Self {
        Self
    }
}

impl Decoder for Rv32Decoder {
    fn decode(&self, line: &str) -> Decoded {
        let mut tokens: Vec<&str> = line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
            .collect();

        let mut label = None;
        if let Some(name) = tokens.first().and_then(|t| t.strip_suffix(':')) {
            label = Some(name.to_string());
            tokens.remove(0);
        }

        let Some((mnemonic, operands)) = tokens.split_first() else {
            return Decoded { label, insn: Ok(None) };
        };

        let insn = decode_operands(mnemonic, operands).map(|mut insn| {
            insn.label = label.clone();
            Some(insn)
        });
        Decoded { label, insn }
    }
}

fn decode_operands(mnemonic: &str, ops: &[&str]) -> Result<Instruction, DecodeError> {
    let desc =
        lookup(mnemonic).ok_or_else(|| DecodeError::UnknownMnemonic(mnemonic.to_string()))?;
    let arity = |n: usize| {
        if ops.len() < n {
            Err(DecodeError::Operands {
                mnemonic: mnemonic.to_string(),
                expected: desc.form.syntax(),
            })
        } else {
            Ok(())
        }
    };

    let insn = match desc.form {
        Form::RegRegImm => {
            arity(3)?;
            Instruction::new(desc.op)
                .rd(reg(ops[0])?)
                .rs1(reg(ops[1])?)
                .imm(imm(ops[2])?)
        }
        Form::RegRegReg => {
            arity(3)?;
            Instruction::new(desc.op)
                .rd(reg(ops[0])?)
                .rs1(reg(ops[1])?)
                .rs2(reg(ops[2])?)
        }
        Form::Shift => {
            arity(3)?;
            let (rd, rs1) = (reg(ops[0])?, reg(ops[1])?);
            match parse_word(ops[2]) {
                Some(shamt) => Instruction::new(Op::Slli).rd(rd).rs1(rs1).imm(shamt),
                None => Instruction::new(Op::Sll).rd(rd).rs1(rs1).rs2(reg(ops[2])?),
            }
        }
        Form::Mem => {
            arity(2)?;
            let (offset, base) = mem_operand(ops[1])?;
            Instruction::new(desc.op)
                .rd(reg(ops[0])?)
                .rs1(base)
                .imm(offset)
        }
        Form::LoadImm => {
            arity(2)?;
            Instruction::new(Op::Addi)
                .rd(reg(ops[0])?)
                .rs1(Reg::ZERO)
                .imm(imm(ops[1])?)
        }
        Form::Branch => {
            arity(3)?;
            let insn = Instruction::new(desc.op)
                .rs1(reg(ops[0])?)
                .rs2(reg(ops[1])?);
            match parse_word(ops[2]) {
                Some(offset) => insn.imm(offset),
                None => insn.target(ops[2]),
            }
        }
        Form::None => Instruction::new(desc.op),
    };
    Ok(insn)
}

fn reg(tok: &str) -> Result<Reg, DecodeError> {
    Reg::parse(tok).ok_or_else(|| DecodeError::BadRegister(tok.to_string()))
}

fn imm(tok: &str) -> Result<i32, DecodeError> {
    parse_word(tok).ok_or_else(|| DecodeError::BadImmediate(tok.to_string()))
}

/// Splits `offset(reg)`; an empty offset means 0.
fn mem_operand(tok: &str) -> Result<(i32, Reg), DecodeError> {
    let bad = || DecodeError::BadMemOperand(tok.to_string());
    let open = tok.find('(').ok_or_else(bad)?;
    let close = tok.rfind(')').ok_or_else(bad)?;
    if close < open {
        return Err(bad());
    }
    let offset = tok[..open].trim();
    let offset = if offset.is_empty() { 0 } else { imm(offset)? };
    let base = reg(tok[open + 1..close].trim())?;
    Ok((offset, base))
}
