use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::decoder::{Reg, NUM_REGS};
use crate::disasm::fmt_instruction;
use crate::exec::{Executor, Flow};
use crate::memory::Bus;
use crate::program::Program;

/// Integer register file. Register 0 reads as zero and ignores writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registers([i32; NUM_REGS]);

impl Default for Registers {
    fn default() -> Self {
        Self([0; NUM_REGS])
    }
}

impl Registers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(&self, r: Reg) -> i32 {
        if r == Reg::ZERO {
            0
        } else {
            self.0[r.index()]
        }
    }

    pub fn write(&mut self, r: Reg, val: i32) {
        if r != Reg::ZERO {
            self.0[r.index()] = val;
        }
    }

    pub fn as_array(&self) -> &[i32; NUM_REGS] {
        &self.0
    }
}

/// Where execution stands after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Running,
    /// An `ecall` was reached; `pc` still points at it.
    Halted,
    /// `pc` ran past the last instruction.
    Exhausted,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cpu {
    /// Program index of the next instruction (not a byte address).
    pub pc: u32,
    pub regs: Registers,
}

impl Cpu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.pc = 0;
        self.regs = Registers::new();
    }

    pub fn step<B: Bus, X: Executor>(
        &mut self,
        bus: &mut B,
        program: &Program,
        exec: &X,
    ) -> Status {
        let pc = self.pc;
        let Some(insn) = program.get(pc) else {
            return Status::Exhausted;
        };
        trace!(pc, insn = %fmt_instruction(insn), "exec");

        // Branches overwrite this candidate.
        self.pc = pc.wrapping_add(1);
        match exec.exec(self, bus, program.labels(), insn) {
            Flow::Halt => {
                self.pc = pc;
                Status::Halted
            }
            Flow::Next if (self.pc as usize) < program.len() => Status::Running,
            Flow::Next => Status::Exhausted,
        }
    }
}
