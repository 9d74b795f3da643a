use std::io::Read;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tapevm::exec::{RunConfig, Status, run};
use tapevm::explain::explain;
use tapevm::help;
use tapevm::parser::{Variant, parse};

#[derive(Parser)]
#[command(
    name = "tapevm",
    about = "A bounded tape-machine VM and explainer",
    after_help = help::REFERENCE
)]
struct Cli {
    /// Program text (instead of --input or stdin).
    #[arg(long)]
    code: Option<String>,

    /// Read the program text from a file instead of stdin.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Size of the tape in cells.
    #[arg(long, default_value_t = 5)]
    memory: usize,

    /// Seed for the random-input instruction.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Wall-clock budget for run mode (e.g. 500ms, 2s, or bare milliseconds).
    #[arg(long, default_value = "1s", value_parser = parse_timeout)]
    timeout: Duration,

    /// Use the original brainfuck dialect.
    #[arg(long)]
    original: bool,

    /// Read and render cells as signed bytes.
    #[arg(long)]
    signed: bool,

    /// Fault on arithmetic overflow instead of wrapping.
    #[arg(long)]
    strict: bool,

    /// Execute the program (the default is to explain it).
    #[arg(long)]
    run: bool,

    /// Log the machine state after every step.
    #[arg(long)]
    step: bool,
}

/// Parse a timeout such as "500ms", "2s" or a bare millisecond count.
fn parse_timeout(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    let (digits, unit) = if let Some(rest) = s.strip_suffix("ms") {
        (rest, Duration::from_millis as fn(u64) -> Duration)
    } else if let Some(rest) = s.strip_suffix('s') {
        (rest, Duration::from_secs as fn(u64) -> Duration)
    } else {
        (s, Duration::from_millis as fn(u64) -> Duration)
    };
    let count: u64 = digits
        .trim()
        .parse()
        .map_err(|e| format!("invalid timeout '{s}': {e}"))?;
    Ok(unit(count))
}

fn read_source(cli: &Cli) -> Result<String, String> {
    if let Some(code) = &cli.code {
        return Ok(code.clone());
    }
    if let Some(path) = &cli.input {
        return std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read {}: {e}", path.display()));
    }
    let mut source = String::new();
    std::io::stdin()
        .read_to_string(&mut source)
        .map_err(|e| format!("cannot read stdin: {e}"))?;
    Ok(source)
}

fn main() {
    let cli = Cli::parse();

    let source = match read_source(&cli) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let variant = if cli.original {
        Variant::Original
    } else {
        Variant::Modern
    };

    let program = match parse(&source, variant) {
        Ok(program) => program,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    if !cli.run {
        for line in explain(&program) {
            println!("{line}");
        }
        return;
    }

    let Some(memory) = NonZeroUsize::new(cli.memory) else {
        eprintln!("at least one cell of tape must be allocated");
        std::process::exit(1);
    };

    let config = RunConfig {
        memory,
        seed: cli.seed,
        timeout: cli.timeout,
        variant,
        signed: cli.signed,
        strict: cli.strict,
        trace: cli.step,
    };

    let outcome = run(&program, &config);
    for line in &outcome.output {
        println!("{line}");
    }
    eprintln!("{}", outcome.state);
    eprintln!("status: {}", outcome.status);
    if matches!(outcome.status, Status::Fault(_)) {
        std::process::exit(1);
    }
}
