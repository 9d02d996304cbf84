use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::fmt::Write as _;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use rv32_asm::{analyze, load_program, EdgeKind, Listing, Report};
use rv32_sim::SimConfig;

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect assembled rv32-sim programs", long_about = None)]
struct Cli {
    /// Assembly source path
    #[arg(value_name = "SOURCE")]
    input: PathBuf,
    /// Data memory size in bytes
    #[arg(long)]
    mem_size: Option<usize>,
    /// First address used by `.data` directives
    #[arg(long)]
    data_base: Option<u32>,
    /// Subcommand
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Indexed instruction listing with labels and initialised data
    Listing {
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Write output to file instead of stdout
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Instruction and data label tables
    Symbols {
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Basic blocks, control-flow edges and unresolved branch labels
    Analyze {
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(serde::Serialize)]
struct SymbolsOut<'a> {
    labels: &'a [rv32_asm::Symbol],
    data_labels: &'a [rv32_asm::Symbol],
}

fn render_listing(listing: &Listing) -> String {
    let mut s = String::new();
    for line in &listing.instructions {
        for label in &line.labels {
            let _ = writeln!(s, "{label}:");
        }
        let _ = writeln!(s, "{:>5}    {}", line.index, line.text);
    }
    for sym in listing.trailing_labels() {
        let _ = writeln!(s, "{}:", sym.name);
    }
    if !listing.data.is_empty() {
        let _ = writeln!(s, "\n.data");
        for w in &listing.data {
            let names: Vec<&str> = listing
                .data_labels
                .iter()
                .filter(|d| d.value == w.addr)
                .map(|d| d.name.as_str())
                .collect();
            for name in names {
                let _ = writeln!(s, "{name}:");
            }
            let _ = writeln!(s, "{:>5}    .word {}", w.addr, w.value);
        }
    }
    s
}

fn render_symbols(listing: &Listing) -> String {
    let mut s = String::new();
    let _ = writeln!(s, "{:<24} {:>8}", "label", "index");
    for sym in &listing.labels {
        let _ = writeln!(s, "{:<24} {:>8}", sym.name, sym.value);
    }
    let _ = writeln!(s, "\n{:<24} {:>8}", "data label", "address");
    for sym in &listing.data_labels {
        let _ = writeln!(s, "{:<24} {:>8}", sym.name, sym.value);
    }
    s
}

fn render_report(report: &Report) -> String {
    let mut s = String::new();
    let _ = writeln!(s, "blocks:");
    for b in &report.blocks {
        let _ = writeln!(s, "  [{}, {})", b.start, b.end);
    }
    let _ = writeln!(s, "edges:");
    for e in &report.edges {
        let kind = match e.kind {
            EdgeKind::Fallthrough => "fallthrough",
            EdgeKind::Branch => "branch",
        };
        let _ = writeln!(s, "  {} -> {} ({kind})", e.from, e.to);
    }
    if !report.halts.is_empty() {
        let _ = writeln!(s, "halts: {:?}", report.halts);
    }
    for u in &report.unresolved {
        let _ = writeln!(s, "warning: branch at {} targets undefined label `{}`", u.index, u.label);
    }
    if !report.unreachable.is_empty() {
        let _ = writeln!(s, "unreachable: {:?}", report.unreachable);
    }
    s
}

fn emit(out: Option<PathBuf>, text: String) -> Result<()> {
    match out {
        Some(path) => std::fs::write(&path, text)?,
        None => print!("{text}"),
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut cfg = SimConfig::default();
    if let Some(n) = cli.mem_size {
        cfg.mem_size = n;
    }
    if let Some(base) = cli.data_base {
        cfg.data_base = base;
    }
    let sim = load_program(&cli.input, cfg)?;
    let listing = Listing::new(sim.program(), sim.memory());

    match cli.cmd {
        Command::Listing { format, out } => {
            let text = match format {
                OutputFormat::Text => render_listing(&listing),
                OutputFormat::Json => serde_json::to_string_pretty(&listing)? + "\n",
            };
            emit(out, text)?;
        }
        Command::Symbols { format, out } => {
            let text = match format {
                OutputFormat::Text => render_symbols(&listing),
                OutputFormat::Json => {
                    let syms = SymbolsOut {
                        labels: &listing.labels,
                        data_labels: &listing.data_labels,
                    };
                    serde_json::to_string_pretty(&syms)? + "\n"
                }
            };
            emit(out, text)?;
        }
        Command::Analyze { format, out } => {
            let report = analyze(sim.program());
            let text = match format {
                OutputFormat::Text => render_report(&report),
                OutputFormat::Json => serde_json::to_string_pretty(&report)? + "\n",
            };
            emit(out, text)?;
        }
    }

    Ok(())
}
