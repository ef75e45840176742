//! altium-libdecode: decodes Altium Designer `.PcbLib`/`.SchLib` library
//! files into open, text-based geometry descriptions.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use altium_libdecode::altium::pcblib::{writer as pcblib_writer, PcbLib};
use altium_libdecode::altium::schlib::{writer as schlib_writer, SchLib};
use altium_libdecode::config;

/// Decodes an Altium `.PcbLib` or `.SchLib` file into text geometry files.
#[derive(Parser, Debug)]
#[command(name = "altium-libdecode")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Decode a PCB footprint library (`.PcbLib`).
    #[arg(short = 'p', long, conflicts_with = "schlib")]
    pcblib: bool,

    /// Decode a schematic symbol library (`.SchLib`).
    #[arg(short = 's', long, conflicts_with = "pcblib")]
    schlib: bool,

    /// Path to the library file to decode.
    #[arg(short = 'f', long, value_name = "FILENAME")]
    file: PathBuf,

    /// Directory to write decoded output (and extracted STEP models) into.
    #[arg(short = 'o', long, value_name = "DIR", default_value = ".")]
    out_dir: PathBuf,

    /// Path to configuration file.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease logging verbosity (only show errors).
    #[arg(short, long)]
    quiet: bool,
}

/// Determines the log level from CLI arguments.
fn get_log_level(verbose: u8, quiet: bool, config_level: &str) -> Level {
    if quiet {
        return Level::ERROR;
    }

    match verbose {
        0 => match config_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "error" => Level::ERROR,
            _ => Level::WARN,
        },
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Initialises the tracing subscriber for logging.
fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();

    if !args.pcblib && !args.schlib {
        eprintln!("exactly one of -p/--pcblib or -s/--schlib is required");
        return ExitCode::FAILURE;
    }

    let config_path = args.config.as_deref();
    let cfg = match config_path {
        Some(_) => match config::load_config(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("Configuration error: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => config::Config::default(),
    };

    let log_level = get_log_level(args.verbose, args.quiet, &cfg.logging.level);
    init_tracing(log_level);

    eprintln!(
        "altium-libdecode {}  Copyright (C) 2025  Embedded Society",
        env!("CARGO_PKG_VERSION")
    );
    eprintln!("This program comes with ABSOLUTELY NO WARRANTY.");
    eprintln!("This is free software, licensed under GPL-3.0-or-later.");
    eprintln!();

    if let Err(e) = std::fs::create_dir_all(&args.out_dir) {
        error!(error = %e, dir = %args.out_dir.display(), "failed to create output directory");
        return ExitCode::FAILURE;
    }

    let result = if args.pcblib {
        decode_pcblib(&args.file, &args.out_dir)
    } else {
        decode_schlib(&args.file, &args.out_dir)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "decode failed");
            ExitCode::FAILURE
        }
    }
}

fn decode_pcblib(file: &PathBuf, out_dir: &std::path::Path) -> altium_libdecode::altium::AltiumResult<()> {
    let lib = PcbLib::open(file, Some(out_dir))?;
    info!(count = lib.footprints.len(), "decoded footprints");
    for footprint in &lib.footprints {
        pcblib_writer::write_footprint(footprint, out_dir)?;
    }
    Ok(())
}

fn decode_schlib(file: &PathBuf, out_dir: &std::path::Path) -> altium_libdecode::altium::AltiumResult<()> {
    let lib = SchLib::open(file)?;
    info!(count = lib.symbols.len(), "decoded symbols");
    schlib_writer::write_library(&lib, out_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }

    #[test]
    fn mode_flags_conflict() {
        let result = Args::try_parse_from(["altium-libdecode", "-p", "-s", "-f", "x.PcbLib"]);
        assert!(result.is_err());
    }
}
