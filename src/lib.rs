pub mod assembler;
pub mod cpu;
pub mod decoder;
pub mod disasm;
pub mod exec;
pub mod instructions;
pub mod memory;
pub mod program;
pub mod sim;
pub mod symbol;

pub mod isa {
    pub mod rv32; // RV32I subset plus mul
}

pub use assembler::{AsmConfig, Assembler};
pub use cpu::{Cpu, Registers, Status};
pub use decoder::{Instruction, Op, Reg};
pub use memory::{Bus, LinearMemory, MemoryError};
pub use program::Program;
pub use sim::{LoadError, RunSummary, SimConfig, Simulator};
pub use symbol::SymbolTable;
