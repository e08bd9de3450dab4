//! huffpress - compress and decompress files with static Huffman coding.
//!
//! Usage: huffpress [OPTIONS] <compress|decompress> <INPUT>

use std::process::ExitCode;

use huffpress::config::{Command, Invocation, OutputFormat, OUTPUT_DIR_ENV};
use huffpress::{compress, decompress, Config};

fn main() -> ExitCode {
    env_logger::init();

    let env_output_dir = std::env::var_os(OUTPUT_DIR_ENV).map(Into::into);
    let config = match Config::from_args(std::env::args().skip(1), env_output_dir) {
        Ok(Invocation::Run(config)) => config,
        Ok(Invocation::Help) => {
            print_usage();
            return ExitCode::SUCCESS;
        }
        Ok(Invocation::Version) => {
            println!("huffpress {}", env!("CARGO_PKG_VERSION"));
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("error: {e}");
            print_usage();
            return ExitCode::from(2);
        }
    };

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::debug!("{e:?}");
            eprintln!("error: {e}");
            ExitCode::from(1)
        }
    }
}

fn run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let rendered = match config.command {
        Command::Compress => {
            let report = compress(&config.input, &config.output_dir, &config.options)?;
            render(&report, config.format)?
        }
        Command::Decompress => {
            let report = decompress(&config.input, &config.output_dir, &config.options)?;
            render(&report, config.format)?
        }
    };

    if !config.quiet {
        print!("{rendered}");
    }
    Ok(())
}

fn render<T>(report: &T, format: OutputFormat) -> serde_json::Result<String>
where
    T: serde::Serialize + std::fmt::Display,
{
    match format {
        OutputFormat::Table => Ok(report.to_string()),
        OutputFormat::Json => serde_json::to_string_pretty(report).map(|s| s + "\n"),
    }
}

fn print_usage() {
    eprintln!(
        "Usage: huffpress [OPTIONS] <COMMAND> <INPUT>

Commands:
  compress      Write <INPUT stem>.huff into the output directory
  decompress    Restore a .huff file using the extension stored in its header

Options:
  -o, --output-dir <DIR>    Where to write output (default: ${OUTPUT_DIR_ENV} or .)
  -f, --format <FORMAT>     table | json (default: table)
  -b, --buffer-size <N>     Bytes read per chunk (default: 8192)
  -q, --quiet               Do not print the report
  -h, --help                Print this help
  -V, --version             Print version

Set RUST_LOG=debug for details."
    );
}
