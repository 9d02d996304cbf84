use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use rv32_sim::decoder::NUM_REGS;
use rv32_sim::{SimConfig, Simulator, Status};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Assemble and run an RV32 subset program on the rv32-sim interpreter"
)]
struct Opts {
    #[arg(value_name = "SOURCE")]
    input: PathBuf,
    /// JSON file with simulator settings (`mem_size`, `data_base`)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Data memory size in bytes
    #[arg(long)]
    mem_size: Option<usize>,
    /// First address used by `.data` directives
    #[arg(long)]
    data_base: Option<u32>,
    /// Stop after this many instructions (default: run until ecall or end)
    #[arg(long)]
    max_steps: Option<u64>,
    /// First byte of the memory dump
    #[arg(long, default_value_t = 0u32)]
    dump_start: u32,
    /// Length of the memory dump in bytes
    #[arg(long, default_value_t = 96u32)]
    dump_len: u32,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Serialize)]
struct WordOut {
    addr: u32,
    value: i32,
}

#[derive(Serialize)]
struct Dump<'a> {
    status: Status,
    steps: u64,
    pc: u32,
    registers: &'a [i32; NUM_REGS],
    memory: Vec<WordOut>,
}

fn load_config(opts: &Opts) -> Result<SimConfig> {
    let mut cfg = match &opts.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => SimConfig::default(),
    };
    if let Some(n) = opts.mem_size {
        cfg.mem_size = n;
    }
    if let Some(base) = opts.data_base {
        cfg.data_base = base;
    }
    Ok(cfg)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let opts = Opts::parse();
    let mut sim = Simulator::new(load_config(&opts)?);
    sim.load_file(&opts.input)?;

    let summary = match opts.max_steps {
        Some(max) => sim.run_bounded(max),
        None => sim.run(),
    };
    if summary.status == Status::Running {
        warn!(steps = summary.steps, "step limit reached before the program finished");
    }

    let window = sim.memory_window(opts.dump_start, opts.dump_len);
    match opts.format {
        OutputFormat::Text => {
            println!("Register file:");
            for (i, v) in sim.registers().as_array().iter().enumerate() {
                println!("x{i} = {v}");
            }
            if !window.is_empty() {
                let start = opts.dump_start;
                let cap = sim.config().mem_size as u64;
                let end = (start as u64 + opts.dump_len as u64).min(cap) - 1;
                println!("\nMemory dump from {start} to {end}:");
                for (addr, val) in &window {
                    println!("[{addr}] = {val}");
                }
            }
        }
        OutputFormat::Json => {
            let dump = Dump {
                status: summary.status,
                steps: summary.steps,
                pc: sim.pc(),
                registers: sim.registers().as_array(),
                memory: window
                    .iter()
                    .map(|&(addr, value)| WordOut { addr, value })
                    .collect(),
            };
            println!("{}", serde_json::to_string_pretty(&dump)?);
        }
    }

    Ok(())
}
