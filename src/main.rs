use std::{path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use clap::Parser;
use ls8::{alu::AluSupport, dumper, loader, Console, Machine, MachineConfig, Outcome};
use num_format::{Locale, ToFormattedString};
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Registry};

const EXIT_FAULT: u8 = 1;
const EXIT_ERROR: u8 = 2;
const EXIT_CYCLE_LIMIT: u8 = 3;

/// Run an LS-8 program.
#[derive(Parser, Debug)]
#[clap(name = "ls8", version, about)]
struct Args {
    /// Program file, one 8-digit binary literal per line
    #[clap(value_parser)]
    program: PathBuf,

    /// Log every executed instruction on the `ls8::trace` target
    #[clap(long, action)]
    trace: bool,

    /// Abort after this many instructions
    #[clap(long, value_parser)]
    max_cycles: Option<u64>,

    /// Which ALU operations are available
    #[clap(long, value_enum, default_value = "full")]
    alu: AluSupport,

    /// Write the final machine state as JSON to this file
    #[clap(long, value_parser)]
    snapshot: Option<PathBuf>,

    /// Write the final machine state to a timestamped file in ./dumps
    #[clap(long, action)]
    dump: bool,
}

fn setup_tracing(trace: bool) {
    let mut filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    if trace {
        if let Ok(directive) = "ls8::trace=trace".parse() {
            filter = filter.add_directive(directive);
        }
    }
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);
    let subscriber = Registry::default().with(filter).with(fmt_layer);
    // only fails if a subscriber is already installed
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn run(args: &Args) -> Result<ExitCode> {
    let program = loader::load_file(&args.program)
        .with_context(|| format!("could not load {}", args.program.display()))?;

    let config = MachineConfig {
        max_cycles: args.max_cycles,
        trace: args.trace,
        alu: args.alu,
    };
    let mut machine = Machine::with_config(config, Console::stdout());
    machine.load(&program)?;

    let result = machine.run();
    tracing::info!(
        "executed {} cycles",
        machine.cycles().to_formatted_string(&Locale::en)
    );

    let snapshot = machine.snapshot();
    if let Some(path) = &args.snapshot {
        dumper::write(path, &snapshot)
            .with_context(|| format!("could not write snapshot to {}", path.display()))?;
    }
    if args.dump {
        let path = dumper::dump("ls8", &snapshot).context("could not dump machine state")?;
        tracing::info!(path = %path.display(), "dumped machine state");
    }

    Ok(match result {
        Ok(Outcome::Halted) => ExitCode::SUCCESS,
        Ok(Outcome::CycleLimitReached) => {
            eprintln!(
                "cycle limit reached after {} cycles at pc {:#04x}",
                machine.cycles().to_formatted_string(&Locale::en),
                machine.program_counter()
            );
            ExitCode::from(EXIT_CYCLE_LIMIT)
        }
        Err(error) => {
            eprintln!("fault: {error}");
            ExitCode::from(EXIT_FAULT)
        }
    })
}

fn main() -> ExitCode {
    let args = Args::parse();
    setup_tracing(args.trace);
    match run(&args) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}
