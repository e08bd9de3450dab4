use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

/// Environment variable naming the default output directory.
pub const OUTPUT_DIR_ENV: &str = "HUFFPRESS_OUTPUT_DIR";

const DEFAULT_BUFFER_SIZE: usize = 8 * 1024;

/// Knobs shared by the compression and decompression passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecOptions {
    /// Bytes read per chunk in every linear pass.
    pub buffer_size: usize,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Compress,
    Decompress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl FromStr for OutputFormat {
    type Err = UsageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            other => Err(UsageError(format!("unknown output format: {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct UsageError(pub String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub command: Command,
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub format: OutputFormat,
    pub quiet: bool,
    pub options: CodecOptions,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Run(Config),
    Help,
    Version,
}

impl Config {
    /// Parses command-line arguments (without the program name). `env_output_dir`
    /// is used when `--output-dir` is absent; otherwise output goes to the
    /// current directory.
    pub fn from_args<I>(args: I, env_output_dir: Option<PathBuf>) -> Result<Invocation, UsageError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let mut command = None;
        let mut input = None;
        let mut output_dir = None;
        let mut format = OutputFormat::default();
        let mut quiet = false;
        let mut options = CodecOptions::default();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-h" | "--help" => return Ok(Invocation::Help),
                "-V" | "--version" => return Ok(Invocation::Version),
                "-q" | "--quiet" => quiet = true,
                "-o" | "--output-dir" => {
                    output_dir = Some(PathBuf::from(value_for(&arg, args.next())?));
                }
                "-f" | "--format" => {
                    format = value_for(&arg, args.next())?.parse()?;
                }
                "-b" | "--buffer-size" => {
                    let value = value_for(&arg, args.next())?;
                    options.buffer_size = match value.parse::<usize>() {
                        Ok(n) if n > 0 => n,
                        _ => return Err(UsageError(format!("invalid buffer size: {value}"))),
                    };
                }
                s if s.starts_with('-') && s.len() > 1 => {
                    return Err(UsageError(format!("unknown option: {s}")));
                }
                _ if command.is_none() => {
                    command = Some(match arg.as_str() {
                        "compress" => Command::Compress,
                        "decompress" => Command::Decompress,
                        other => return Err(UsageError(format!("unknown command: {other}"))),
                    });
                }
                _ if input.is_none() => input = Some(PathBuf::from(arg)),
                _ => return Err(UsageError(format!("unexpected argument: {arg}"))),
            }
        }

        let command = command.ok_or_else(|| UsageError("missing command".into()))?;
        let input = input.ok_or_else(|| UsageError("missing input path".into()))?;
        let output_dir = output_dir
            .or(env_output_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Invocation::Run(Config {
            command,
            input,
            output_dir,
            format,
            quiet,
            options,
        }))
    }
}

fn value_for(flag: &str, value: Option<String>) -> Result<String, UsageError> {
    value.ok_or_else(|| UsageError(format!("{flag} needs a value")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Invocation, UsageError> {
        Config::from_args(args.iter().map(|s| s.to_string()), None)
    }

    #[test]
    fn compress_with_defaults() {
        let Invocation::Run(config) = parse(&["compress", "notes.txt"]).unwrap() else {
            panic!("expected a run");
        };
        assert_eq!(config.command, Command::Compress);
        assert_eq!(config.input, PathBuf::from("notes.txt"));
        assert_eq!(config.output_dir, PathBuf::from("."));
        assert_eq!(config.format, OutputFormat::Table);
        assert!(!config.quiet);
        assert_eq!(config.options, CodecOptions::default());
    }

    #[test]
    fn options_anywhere() {
        let Invocation::Run(config) = parse(&[
            "-f", "json", "decompress", "-o", "out", "notes.huff", "--buffer-size", "16", "-q",
        ])
        .unwrap() else {
            panic!("expected a run");
        };
        assert_eq!(config.command, Command::Decompress);
        assert_eq!(config.input, PathBuf::from("notes.huff"));
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.format, OutputFormat::Json);
        assert!(config.quiet);
        assert_eq!(config.options.buffer_size, 16);
    }

    #[test]
    fn env_output_dir_is_fallback() {
        let args = ["compress", "a.txt"].map(String::from);
        let Invocation::Run(config) = Config::from_args(args, Some("/tmp/env".into())).unwrap() else {
            panic!("expected a run");
        };
        assert_eq!(config.output_dir, PathBuf::from("/tmp/env"));

        let args = ["compress", "a.txt", "-o", "flag"].map(String::from);
        let Invocation::Run(config) = Config::from_args(args, Some("/tmp/env".into())).unwrap() else {
            panic!("expected a run");
        };
        assert_eq!(config.output_dir, PathBuf::from("flag"));
    }

    #[test]
    fn help_and_version() {
        assert_eq!(parse(&["--help"]).unwrap(), Invocation::Help);
        assert_eq!(parse(&["compress", "-V"]).unwrap(), Invocation::Version);
    }

    #[test]
    fn usage_errors() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["compress"]).is_err());
        assert!(parse(&["explode", "x"]).is_err());
        assert!(parse(&["compress", "a", "b"]).is_err());
        assert!(parse(&["compress", "a", "--format", "xml"]).is_err());
        assert!(parse(&["compress", "a", "-b", "0"]).is_err());
        assert!(parse(&["compress", "a", "-o"]).is_err());
        assert!(parse(&["compress", "a", "--loud"]).is_err());
    }
}
