mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;
use lineframe_transport::{LineConfig, DEFAULT_MAX_LINE_LENGTH};

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "lineframe", version, about = "Line-framed message codec CLI")]
struct Cli {
    /// Output format for decoded messages.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(
        long,
        value_name = "FORMAT",
        default_value = "text",
        env = "LINEFRAME_LOG_FORMAT",
        global = true
    )]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(
        long,
        value_name = "LEVEL",
        default_value = "info",
        env = "LINEFRAME_LOG_LEVEL",
        global = true
    )]
    log_level: LogLevel,

    /// Longest accepted input line in bytes.
    #[arg(
        long,
        value_name = "BYTES",
        default_value_t = DEFAULT_MAX_LINE_LENGTH,
        env = "LINEFRAME_MAX_LINE",
        global = true
    )]
    max_line: usize,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let line_config = LineConfig {
        max_line_length: cli.max_line,
    };
    let result = cmd::run(cli.command, format, line_config);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}
