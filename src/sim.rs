//! One simulation run: machine state, the assembled program and its label
//! tables, owned together.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::assembler::{AsmConfig, Assembler, DEFAULT_DATA_BASE};
use crate::cpu::{Cpu, Registers, Status};
use crate::decoder::Reg;
use crate::exec::IntExecutor;
use crate::memory::LinearMemory;
use crate::program::Program;

pub const DEFAULT_MEM_SIZE: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Data memory capacity in bytes.
    pub mem_size: usize,
    /// First address written by `.data` directives.
    pub data_base: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            mem_size: DEFAULT_MEM_SIZE,
            data_base: DEFAULT_DATA_BASE,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Instructions executed by this call.
    pub steps: u64,
    pub status: Status,
}

pub struct Simulator {
    cfg: SimConfig,
    cpu: Cpu,
    mem: LinearMemory,
    program: Program,
    status: Status,
}

impl Simulator {
    pub fn new(cfg: SimConfig) -> Self {
        Self {
            cfg,
            cpu: Cpu::new(),
            mem: LinearMemory::new(cfg.mem_size),
            program: Program::default(),
            status: Status::Exhausted,
        }
    }

    pub fn config(&self) -> SimConfig {
        self.cfg
    }

    /// Assembles `source` into a freshly zeroed machine.
    pub fn load_source(&mut self, source: &str) {
        self.cpu.reset();
        self.mem = LinearMemory::new(self.cfg.mem_size);
        let asm = Assembler::new(AsmConfig {
            data_base: self.cfg.data_base,
        });
        self.program = asm.assemble(source, &mut self.mem);
        self.status = if self.program.is_empty() {
            Status::Exhausted
        } else {
            Status::Running
        };
    }

    /// Reads and assembles a source file. Nothing is touched if the read fails.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<(), LoadError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), bytes = source.len(), "loaded source");
        self.load_source(&source);
        Ok(())
    }

    pub fn step(&mut self) -> Status {
        if self.status == Status::Running {
            self.status = self.cpu.step(&mut self.mem, &self.program, &IntExecutor);
        }
        self.status
    }

    /// Runs until `ecall` or until the program counter leaves the program.
    /// A program that does neither never returns.
    pub fn run(&mut self) -> RunSummary {
        self.run_inner(None)
    }

    /// Like [`run`](Self::run) but stops after `max_steps` instructions,
    /// reporting [`Status::Running`] if the program had not finished.
    pub fn run_bounded(&mut self, max_steps: u64) -> RunSummary {
        self.run_inner(Some(max_steps))
    }

    fn run_inner(&mut self, limit: Option<u64>) -> RunSummary {
        let mut steps = 0u64;
        while self.status == Status::Running {
            if limit.is_some_and(|max| steps >= max) {
                break;
            }
            self.step();
            steps += 1;
        }
        info!(steps, status = ?self.status, pc = self.cpu.pc, "run finished");
        RunSummary {
            steps,
            status: self.status,
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn pc(&self) -> u32 {
        self.cpu.pc
    }

    pub fn registers(&self) -> &Registers {
        &self.cpu.regs
    }

    pub fn register(&self, r: Reg) -> i32 {
        self.cpu.regs.read(r)
    }

    pub fn memory(&self) -> &LinearMemory {
        &self.mem
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Word at `addr`, or 0 when the word does not fit in memory.
    pub fn load_word(&self, addr: u32) -> i32 {
        self.mem.peek_u32(addr).map_or(0, |v| v as i32)
    }

    /// Words of `[start, start + len)`, clipped to memory capacity.
    pub fn memory_window(&self, start: u32, len: u32) -> Vec<(u32, i32)> {
        self.mem.window(start, len)
    }
}
