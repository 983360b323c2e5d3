use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use xxhash_rust::xxh3::xxh3_64;

use mozlz4_cli::{
    exit_code, human_bytes, init_logging, parse_args, ratio, run_compress, run_decompress,
};
use mozlz4_codecs::Lz4Codec;
use mozlz4_core::buffer::INITIAL_CAPACITY;
use mozlz4_core::{decode_frame, DriverOptions, Frame, Source};

// ── CLI definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "mozlz4",
    about = "Read, write, and inspect Mozilla mozLz40 (jsonlz4) files",
    version
)]
struct Cli {
    /// Log more to stderr (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a file into a mozLz40 frame
    Compress {
        /// Source file ("-" reads stdin)
        input: PathBuf,
        /// Destination file ("-" or omitted writes to stdout)
        output: Option<PathBuf>,
    },
    /// Decompress a mozLz40 frame back to raw bytes
    Decompress {
        /// Source file ("-" or omitted reads stdin)
        input: Option<PathBuf>,
        /// Destination file ("-" or omitted writes to stdout)
        output: Option<PathBuf>,
        /// Fail instead of warning when the output size differs from the header
        #[arg(long)]
        strict: bool,
    },
    /// Print header fields and payload statistics
    Inspect {
        /// mozLz40 file to inspect ("-" or omitted reads stdin)
        file: Option<PathBuf>,
        /// Also decompress and compare against the declared size
        #[arg(long)]
        verify: bool,
    },
}

// ── Subcommand implementations ─────────────────────────────────────────────

fn run_inspect(file: Option<PathBuf>, verify: bool) -> anyhow::Result<()> {
    let source = Source::from_arg(file.as_deref());
    let data = source.read_all(INITIAL_CAPACITY)?;
    let frame = Frame::parse(&data).with_context(|| format!("{source} is not a mozLz40 file"))?;
    let declared = frame.declared_size() as usize;

    println!("=== mozLz40 file: {} ===", source);
    println!();
    println!("  magic          : mozLz40\\0");
    println!("  declared size  : {}", human_bytes(declared as u64));
    println!("  payload        : {}", human_bytes(frame.payload.len() as u64));
    println!("  file size      : {}", human_bytes(data.len() as u64));
    println!("  ratio          : {:.2}x", ratio(declared, data.len()));
    println!("  payload xxh3   : {:016x}", xxh3_64(frame.payload));

    if verify {
        let (raw, conversion) = decode_frame(&data, &Lz4Codec, &DriverOptions::default())?;
        let verdict = if conversion.size_matches(raw.len()) {
            "matches header"
        } else {
            "differs from header"
        };
        println!("  decompressed   : {} ({})", human_bytes(raw.len() as u64), verdict);
        println!("  content xxh3   : {:016x}", xxh3_64(&raw));
    }

    Ok(())
}

// ── Entry point ────────────────────────────────────────────────────────────

fn main() -> ExitCode {
    let cli = match parse_args::<Cli>() {
        Ok(cli) => cli,
        Err(code) => return code,
    };
    init_logging(cli.verbose);
    let result = match cli.command {
        Commands::Compress { input, output } => run_compress(Some(input.as_path()), output.as_deref()),
        Commands::Decompress {
            input,
            output,
            strict,
        } => run_decompress(input.as_deref(), output.as_deref(), strict),
        Commands::Inspect { file, verify } => run_inspect(file, verify),
    };
    exit_code(result)
}
