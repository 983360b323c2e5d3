//! Shared plumbing for the mozLz40 command-line tools.

use std::ffi::OsString;
use std::io::IsTerminal;
use std::path::Path;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{Command, CommandFactory, Parser};
use tracing::info;
use tracing_subscriber::EnvFilter;

use mozlz4_codecs::Lz4Codec;
use mozlz4_core::{DriverOptions, Sink, Source};

// ── Process setup ──────────────────────────────────────────────────────────

/// Parse the command line, turning clap's own exits into exit codes:
/// help and version succeed, usage errors fail with 1.
///
/// Help only succeeds when it is the whole request. Clap answers `-h` even
/// when surplus operands follow it, so those lines are reported as usage
/// errors instead.
pub fn parse_args<T: Parser>() -> Result<T, ExitCode> {
    let args: Vec<OsString> = std::env::args_os().collect();
    T::try_parse_from(&args).map_err(|err| {
        if err.use_stderr() {
            let _ = err.print();
            return ExitCode::FAILURE;
        }
        if !help_requested_alone(&T::command(), &args) {
            eprint!("{}", err.render());
            return ExitCode::FAILURE;
        }
        let _ = err.print();
        ExitCode::SUCCESS
    })
}

/// Whether every word after the program name is a help or version flag, or
/// a subcommand name leading to one.
fn help_requested_alone(cmd: &Command, args: &[OsString]) -> bool {
    let mut cmd = cmd;
    for arg in args.iter().skip(1) {
        let Some(word) = arg.to_str() else {
            return false;
        };
        match word {
            "-h" | "--help" | "-V" | "--version" | "help" => {}
            name => match cmd.find_subcommand(name) {
                Some(sub) => cmd = sub,
                None => return false,
            },
        }
    }
    true
}

/// Install the stderr log subscriber.
///
/// `RUST_LOG` wins when set; otherwise `verbose` picks warn, info or debug.
pub fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .try_init();
}

/// Report the outcome on stderr and pick the exit code.
pub fn exit_code(result: anyhow::Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

// ── Conversions ────────────────────────────────────────────────────────────

/// Decompress a mozLz40 file. `None` or `-` selects the standard streams.
pub fn run_decompress(input: Option<&Path>, output: Option<&Path>, strict: bool) -> anyhow::Result<()> {
    let source = Source::from_arg(input);
    let sink = Sink::from_arg(output);
    let opts = DriverOptions {
        strict_size: strict,
        ..DriverOptions::default()
    };

    let t0 = Instant::now();
    let conversion = mozlz4_core::decompress(&source, &sink, &Lz4Codec, &opts)?;
    log_summary(conversion.output_len, conversion.input_len, t0.elapsed());
    Ok(())
}

/// Compress into a mozLz40 file. `None` or `-` selects the standard streams.
pub fn run_compress(input: Option<&Path>, output: Option<&Path>) -> anyhow::Result<()> {
    let source = Source::from_arg(input);
    let sink = Sink::from_arg(output);

    let t0 = Instant::now();
    let conversion = mozlz4_core::compress(&source, &sink, &Lz4Codec, &DriverOptions::default())?;
    log_summary(conversion.input_len, conversion.output_len, t0.elapsed());
    Ok(())
}

fn log_summary(raw_len: usize, compressed_len: usize, elapsed: Duration) {
    info!("  raw size    : {}", human_bytes(raw_len as u64));
    info!("  compressed  : {}", human_bytes(compressed_len as u64));
    info!("  ratio       : {:.2}x", ratio(raw_len, compressed_len));
    info!(
        "  throughput  : {}/s",
        human_bytes((raw_len as f64 / elapsed.as_secs_f64().max(f64::EPSILON)) as u64)
    );
    info!("  elapsed     : {:.3}s", elapsed.as_secs_f64());
}

// ── Formatting ─────────────────────────────────────────────────────────────

/// Compression ratio (raw / compressed).
pub fn ratio(raw: usize, compressed: usize) -> f64 {
    if compressed == 0 {
        return 1.0;
    }
    raw as f64 / compressed as f64
}

pub fn human_bytes(n: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut v = n as f64;
    let mut unit = 0;
    while v >= 1024.0 && unit < UNITS.len() - 1 {
        v /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", n)
    } else {
        format!("{:.2} {}", v, UNITS[unit])
    }
}
