//! Command-line driver for the DDR4 DIMM timing simulator.
//!
//! This binary provides a single entry point. It performs:
//! 1. **Trace simulation:** reads a trace file and drives a [`Simulator`]
//!    to completion under the chosen scheduling policy.
//! 2. **Output:** writes a terse (default) or verbose command log to the
//!    configured output file, and optionally a time-in-queue stats report.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use clap::{ArgGroup, Parser};
use tracing_subscriber::EnvFilter;

use dimmsim_core::common::error::ExitClass;
use dimmsim_core::config::{Config, Policy};
use dimmsim_core::emit::terse::TerseEmitter;
use dimmsim_core::emit::verbose::VerboseEmitter;
use dimmsim_core::emit::Emitter;
use dimmsim_core::Simulator;

/// Simulates DDR4 DIMM command timing for a CPU memory-access trace.
#[derive(Parser, Debug)]
#[command(
    name = "dimmsim",
    author,
    version,
    about = "Cycle-accurate DDR4 DIMM timing simulator",
    group(ArgGroup::new("policy").args(["strict", "opt"]))
)]
struct Cli {
    /// Trace file of `<cpu_cycle> <op_code> <hex_address>` lines.
    trace_file: String,

    /// Output file for the command log (`.txt`). Omit the path to default
    /// to `output.txt`; omit the flag entirely to write to stdout.
    #[arg(
        short = 'o',
        long = "output",
        num_args = 0..=1,
        default_missing_value = "output.txt"
    )]
    output: Option<String>,

    /// Use the strict in-order scheduling policy.
    #[arg(long = "strict")]
    strict: bool,

    /// Use the optimized scheduling policy.
    #[arg(long = "opt")]
    opt: bool,

    /// Print a time-in-queue stats report to stdout after the run.
    #[arg(long = "stat")]
    stat: bool,

    /// Emit a verbose, human-readable command log instead of the terse
    /// bit-format (supplemental mode).
    #[arg(long)]
    verbose: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();

    let policy = if cli.strict {
        Policy::Strict
    } else if cli.opt {
        Policy::Optimized
    } else {
        Policy::LooseInOrder
    };

    let config = Config {
        scheduler: dimmsim_core::config::SchedulerConfig {
            policy,
            ..dimmsim_core::config::SchedulerConfig::default()
        },
        ..Config::default()
    };

    let trace_file = match File::open(&cli.trace_file) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("error: cannot open trace file {}: {err}", cli.trace_file);
            return ExitCode::FAILURE;
        }
    };

    let writer: Box<dyn Write> = match cli.output {
        None => Box::new(io::stdout()),
        Some(path) => {
            if !path.ends_with(".txt") {
                eprintln!("error: output path {path} must end in .txt");
                return ExitCode::FAILURE;
            }
            match File::create(&path) {
                Ok(file) => Box::new(BufWriter::new(file)),
                Err(err) => {
                    eprintln!("error: cannot create output file {path}: {err}");
                    return ExitCode::FAILURE;
                }
            }
        }
    };

    let result = if cli.verbose {
        run(trace_file, VerboseEmitter::new(writer), config, cli.stat)
    } else {
        run(trace_file, TerseEmitter::new(writer), config, cli.stat)
    };

    match result {
        Ok(ExitClass::Clean) => ExitCode::SUCCESS,
        Ok(ExitClass::Fatal) => {
            eprintln!("error: simulation time overflowed");
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run<E: Emitter>(
    trace_file: File,
    emitter: E,
    config: Config,
    print_stats: bool,
) -> Result<ExitClass, dimmsim_core::common::SimError> {
    let mut simulator = Simulator::new(trace_file, emitter, config, print_stats);
    let report = simulator.run()?;

    if print_stats {
        if let Some(stats) = &report.stats {
            print!("{stats}");
        }
        let mut stdout = std::io::stdout();
        stdout.flush().ok();
    }

    Ok(report.exit)
}
