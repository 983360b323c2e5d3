//! Compress files into the mozLz40 format used by Firefox bookmark backups.
//!
//! Input and output are both held entirely in memory. Files written here are
//! not standard LZ4 frames; only Mozilla's readers understand them.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};

use mozlz4_cli::{exit_code, init_logging, parse_args, run_compress};

#[derive(Parser)]
#[command(
    name = "jsonlz4",
    about = "Compress IN_FILE to OUT_FILE with the same format as Firefox bookmarks backup",
    version
)]
struct Cli {
    /// File to compress ("-" reads stdin)
    #[arg(value_name = "IN_FILE")]
    input: PathBuf,
    /// Destination mozLz40 file ("-" writes to stdout)
    #[arg(value_name = "OUT_FILE")]
    output: PathBuf,
    /// Log more to stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = match parse_args::<Cli>() {
        Ok(cli) => cli,
        Err(code) => return code,
    };
    init_logging(cli.verbose);
    exit_code(run_compress(Some(cli.input.as_path()), Some(cli.output.as_path())))
}
