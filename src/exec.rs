use tracing::{debug, warn};

use crate::cpu::Cpu;
use crate::decoder::{Instruction, Op, Reg};
use crate::memory::Bus;
use crate::symbol::SymbolTable;

/// What the stepping loop should do after an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Next,
    Halt,
}

pub trait Executor {
    /// Applies `insn` to the machine. On entry `cpu.pc` already holds the
    /// fall-through index; taken branches overwrite it.
    fn exec<B: Bus>(
        &self,
        cpu: &mut Cpu,
        bus: &mut B,
        labels: &SymbolTable,
        insn: &Instruction,
    ) -> Flow;
}

/// 32-bit integer semantics with wrapping arithmetic. Never fails: memory
/// faults read as zero or drop the store, unknown branch labels fall through.
pub struct IntExecutor;

impl Executor for IntExecutor {
    fn exec<B: Bus>(
        &self,
        cpu: &mut Cpu,
        bus: &mut B,
        labels: &SymbolTable,
        insn: &Instruction,
    ) -> Flow {
        let a = read(cpu, insn.rs1);
        let b = read(cpu, insn.rs2);
        match insn.op {
            Op::Addi => write(cpu, insn.rd, a.wrapping_add(insn.imm)),
            Op::Add => write(cpu, insn.rd, a.wrapping_add(b)),
            Op::Sub => write(cpu, insn.rd, a.wrapping_sub(b)),
            Op::Mul => {
                let wide = a as i64 * b as i64;
                write(cpu, insn.rd, wide as i32);
            }
            Op::Sll => write(cpu, insn.rd, shl(a, b)),
            Op::Slli => write(cpu, insn.rd, shl(a, insn.imm)),
            Op::Lw => {
                let addr = a.wrapping_add(insn.imm) as u32;
                let val = match bus.read_u32(addr) {
                    Ok(v) => v as i32,
                    Err(e) => {
                        warn!(pc = cpu.pc.wrapping_sub(1), "load out of range: {e}");
                        0
                    }
                };
                write(cpu, insn.rd, val);
            }
            Op::Sw => {
                let addr = a.wrapping_add(insn.imm) as u32;
                // rd names the register being stored.
                let val = read(cpu, insn.rd);
                if let Err(e) = bus.write_u32(addr, val as u32) {
                    warn!(pc = cpu.pc.wrapping_sub(1), "store out of range: {e}");
                }
            }
            Op::Beq => branch(cpu, labels, insn, a == b),
            Op::Bne => branch(cpu, labels, insn, a != b),
            Op::Ecall => return Flow::Halt,
        }
        Flow::Next
    }
}

fn read(cpu: &Cpu, r: Option<Reg>) -> i32 {
    r.map_or(0, |r| cpu.regs.read(r))
}

fn write(cpu: &mut Cpu, r: Option<Reg>, val: i32) {
    if let Some(r) = r {
        cpu.regs.write(r, val);
    }
}

fn shl(val: i32, amount: i32) -> i32 {
    ((val as u32) << (amount as u32 & 0x1F)) as i32
}

fn branch(cpu: &mut Cpu, labels: &SymbolTable, insn: &Instruction, taken: bool) {
    if !taken {
        return;
    }
    match &insn.target {
        Some(label) => match labels.get(label) {
            Some(index) => cpu.pc = index,
            None => debug!(
                pc = cpu.pc.wrapping_sub(1),
                label = label.as_str(),
                "branch target not defined, falling through"
            ),
        },
        // pc already holds index + 1
        None => cpu.pc = cpu.pc.wrapping_add(insn.imm as u32),
    }
}
