/// zread command-line tool: decompress, describe, and check files made of
/// one or more concatenated zstd frames.
///
/// # Command overview
///
/// ```text
/// zread <COMMAND> [OPTIONS]
///
/// Commands:
///   cat     Decompress every frame (or only the first) to stdout or a file
///   info    Print one line (or one JSON object) per frame
///   test    Decode everything, discard the output, report the frame count
///   help    Print help information
///
/// Global options:
///   -v, --verbose            More logging (-v info, -vv debug)
///   --window-log-max <LOG>   Reject frames needing a larger window
///   -h, --help               Print help
///   -V, --version            Print version
/// ```
///
/// `RUST_LOG` overrides the level chosen with `-v`.
///
/// # Exit codes
///
/// | Code | Meaning                                      |
/// |------|----------------------------------------------|
/// | 0    | Success                                      |
/// | 1    | Error (I/O failure, corrupt frame, etc.)     |
///
/// All error details are written to stderr so stdout can be piped cleanly.
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use log::LevelFilter;
use zread_decoder::EngineConfig;

mod cmd_cat;
mod cmd_info;
mod input;

// ── CLI root ──────────────────────────────────────────────────────────────────

/// Frame-by-frame zstd reader.
#[derive(Parser)]
#[command(name = "zread", version, about = "Frame-by-frame zstd reader")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (repeatable).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Largest window, as log2 bytes, a frame may ask for.
    #[arg(long, global = true, value_name = "LOG")]
    window_log_max: Option<u32>,
}

// ── Sub-commands ──────────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum Commands {
    /// Decompress a file to stdout or to `-o <file>`.
    Cat(CatArgs),
    /// Describe every frame in a file.
    Info(InfoArgs),
    /// Check that every frame in a file decodes.
    Test(TestArgs),
}

// ── Argument structs ──────────────────────────────────────────────────────────

/// Arguments for `zread cat`.
///
/// ```text
/// ┌──────────────┬──────────────────────────────────────────────────┐
/// │ Flag         │ Effect                                           │
/// ├──────────────┼──────────────────────────────────────────────────┤
/// │ -o / --output│ Write to this file instead of stdout             │
/// │ --first-only │ Stop after the first frame, ignore what follows  │
/// └──────────────┴──────────────────────────────────────────────────┘
/// ```
#[derive(clap::Args)]
pub struct CatArgs {
    /// Compressed input; `-` reads stdin.
    pub file: PathBuf,

    /// Write decompressed output to this file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Decode only the first frame.
    #[arg(long)]
    pub first_only: bool,
}

/// Arguments for `zread info`.
#[derive(clap::Args)]
pub struct InfoArgs {
    /// Compressed input; `-` reads stdin.
    pub file: PathBuf,

    /// Print one JSON object per frame instead of a table.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `zread test`.
#[derive(clap::Args)]
pub struct TestArgs {
    /// Compressed input; `-` reads stdin.
    pub file: PathBuf,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = EngineConfig {
        window_log_max: cli.window_log_max,
    };

    let result = match cli.command {
        Commands::Cat(args) => cmd_cat::run(&args, &config),
        Commands::Info(args) => cmd_info::run(&args, &config),
        Commands::Test(args) => cmd_test::run(&args, &config),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}
