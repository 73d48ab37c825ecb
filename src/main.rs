//! PDF Cleaner - command-line interface
//! Author: kartik4091
//! Created: 2026-10-19
//!
//! Removes annotations, comments and images from a PDF file and writes a
//! cleaned copy. Exits with 0 on success and 1 on any failure.

use std::path::PathBuf;
use std::process;
use std::time::Instant;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use pdf_cleaner::utils::{init_logging, LogLevel};
use pdf_cleaner::{CleanerConfig, Error, PdfCleaner, ReportFormat, ReportFormatter};
use tracing::{debug, info};

fn main() {
    // Usage errors exit with 1 like every other failure; --help stays 0.
    let matches = match build_cli().try_get_matches() {
        Ok(matches) => matches,
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            let _ = e.print();
            process::exit(1);
        }
    };

    let log_level = if matches.get_flag("quiet") {
        LogLevel::Error
    } else {
        matches
            .get_one::<LogLevel>("verbose")
            .copied()
            .unwrap_or_default()
    };
    if let Err(e) = init_logging(log_level) {
        eprintln!("Warning: logging unavailable: {}", e);
    }

    if let Err(e) = run(&matches) {
        debug!("Run failed: {:?}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(matches: &ArgMatches) -> Result<(), Error> {
    let input = matches
        .get_one::<PathBuf>("input")
        .expect("input is a required argument");
    let output = matches.get_one::<PathBuf>("output");
    let format = matches
        .get_one::<ReportFormat>("format")
        .copied()
        .unwrap_or_default();

    let config = build_config(matches)?;
    debug!("Configuration: {:?}", config);

    info!("🚀 Cleaning {}", input.display());
    let started = Instant::now();

    let report = PdfCleaner::with_config(config).clean(input, output.map(PathBuf::as_path))?;

    info!("✅ Finished in {:.2?}", started.elapsed());
    println!("{}", ReportFormatter::format(&report, format)?);
    Ok(())
}

fn build_config(matches: &ArgMatches) -> Result<CleanerConfig, Error> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => CleanerConfig::load(path)?,
        None => CleanerConfig::default(),
    };

    // Command-line switches only ever narrow what the config enables.
    if matches.get_flag("keep-annotations") {
        config.remove_annotations = false;
    }
    if matches.get_flag("keep-images") {
        config.remove_images = false;
    }
    if matches.get_flag("no-prune") {
        config.prune_unreferenced = false;
    }
    if matches.get_flag("no-compress") {
        config.compress_streams = false;
    }
    if matches.get_flag("dry-run") {
        config.dry_run = true;
    }

    Ok(config)
}

fn build_cli() -> Command {
    Command::new("pdf-cleaner")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Remove annotations, comments, and images from PDF files")

        // Input/Output
        .arg(Arg::new("input")
            .value_name("INPUT")
            .help("Input PDF file path")
            .value_parser(value_parser!(PathBuf))
            .required(true))

        .arg(Arg::new("output")
            .short('o')
            .long("output")
            .value_name("FILE")
            .help("Output PDF file path (default: <input>_cleaned.pdf)")
            .value_parser(value_parser!(PathBuf)))

        // Configuration
        .arg(Arg::new("config")
            .short('c')
            .long("config")
            .value_name("FILE")
            .help("Configuration file (JSON/YAML)")
            .value_parser(value_parser!(PathBuf)))

        // Processing options
        .arg(Arg::new("keep-annotations")
            .long("keep-annotations")
            .action(ArgAction::SetTrue)
            .help("Leave annotations in place"))

        .arg(Arg::new("keep-images")
            .long("keep-images")
            .action(ArgAction::SetTrue)
            .help("Leave image data in place"))

        .arg(Arg::new("no-prune")
            .long("no-prune")
            .action(ArgAction::SetTrue)
            .help("Keep unreferenced objects when saving"))

        .arg(Arg::new("no-compress")
            .long("no-compress")
            .action(ArgAction::SetTrue)
            .help("Do not deflate streams when saving"))

        .arg(Arg::new("dry-run")
            .long("dry-run")
            .action(ArgAction::SetTrue)
            .help("Report what would be removed without writing a file"))

        // Output and reporting
        .arg(Arg::new("format")
            .short('f')
            .long("format")
            .value_parser(value_parser!(ReportFormat))
            .default_value("text")
            .help("Summary format"))

        // Logging
        .arg(Arg::new("verbose")
            .short('v')
            .long("verbose")
            .value_parser(value_parser!(LogLevel))
            .help("Set logging verbosity [default: warn]"))

        .arg(Arg::new("quiet")
            .short('q')
            .long("quiet")
            .action(ArgAction::SetTrue)
            .conflicts_with("verbose")
            .help("Suppress all log output except errors"))
}
