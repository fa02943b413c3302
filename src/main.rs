use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Compress and decompress files with Huffman coding.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    mode: Mode,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Log filter directive, overrides -v
    #[arg(long, env = "GRIN_LOG", global = true)]
    log: Option<String>,

    /// Do not print the summary line
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Mode {
    /// Compress <INPUT> into the grin file <OUTPUT>
    Encode { input: PathBuf, output: PathBuf },

    /// Decompress the grin file <INPUT> into <OUTPUT>
    Decode { input: PathBuf, output: PathBuf },
}

fn init_logging(cli: &Cli) {
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = cli
        .log
        .as_deref()
        .and_then(|directive| EnvFilter::try_new(directive).ok())
        .unwrap_or_else(|| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    match &cli.mode {
        Mode::Encode { input, output } => {
            let report = grin::encode_file(input, output).with_context(|| {
                format!("failed to encode {} into {}", input.display(), output.display())
            })?;
            if !cli.quiet {
                println!("{}: {}", output.display(), report);
            }
        }
        Mode::Decode { input, output } => {
            let report = grin::decode_file(input, output).with_context(|| {
                format!("failed to decode {} into {}", input.display(), output.display())
            })?;
            if !cli.quiet {
                println!("{}: {}", output.display(), report);
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
