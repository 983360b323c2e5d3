//! Decompress Mozilla bookmark backup files (`.jsonlz4`, `.mozlz4`).

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};

use mozlz4_cli::{exit_code, init_logging, parse_args, run_decompress};

#[derive(Parser)]
#[command(
    name = "dejsonlz4",
    about = "Decompress Mozilla bookmark backup file IN_FILE to OUT_FILE",
    version
)]
struct Cli {
    /// mozLz40 file to decompress ("-" or omitted reads stdin)
    #[arg(value_name = "IN_FILE")]
    input: Option<PathBuf>,
    /// Destination file ("-" or omitted writes to stdout)
    #[arg(value_name = "OUT_FILE")]
    output: Option<PathBuf>,
    /// Fail instead of warning when the output size differs from the header
    #[arg(long)]
    strict: bool,
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
    exit_code(run_decompress(
        cli.input.as_deref(),
        cli.output.as_deref(),
        cli.strict,
    ))
}
