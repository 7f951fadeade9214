//! Command-line front end: prints an HWP document as plain text.
//!
//! ```bash
//! hwptext report.hwp
//! hwptext --format hwp -vv scan.bin > scan.txt
//! ```

use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use hwptext::{Format, TextOptions};
use log::LevelFilter;

/// Extract the text of an HWP document, drawing tables as ASCII grids
#[derive(Parser, Debug)]
#[command(name = "hwptext")]
#[command(version, about, long_about = None)]
struct Args {
    /// Document to read
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Input format (hwp|hwpx); picked from the file extension when omitted
    #[arg(long, value_parser = parse_format)]
    format: Option<Format>,

    /// Log more to stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_format(value: &str) -> Result<Format, String> {
    value.parse().map_err(|e: hwptext::Error| e.to_string())
}

fn level_for(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(level_for(args.verbose))
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .init();

    let format = args.format.unwrap_or_else(|| Format::from_path(&args.file));
    log::info!("reading {} as {}", args.file.display(), format);

    let stdout = io::stdout();
    let out = BufWriter::new(stdout.lock());
    match hwptext::read_path_with(&args.file, format, &TextOptions::default(), out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        },
    }
}
