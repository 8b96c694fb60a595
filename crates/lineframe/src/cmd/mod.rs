use clap::{Args, Subcommand};
use lineframe_transport::LineConfig;
use std::path::PathBuf;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod decode;
pub mod echo;
pub mod encode;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Encode one message and write its frame to stdout.
    Encode(EncodeArgs),
    /// Decode frames and print the messages.
    Decode(DecodeArgs),
    /// Echo every received message back over stdio.
    Echo(EchoArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat, line_config: LineConfig) -> CliResult<i32> {
    match command {
        Command::Encode(args) => encode::run(args),
        Command::Decode(args) => decode::run(args, format, line_config),
        Command::Echo(args) => echo::run(args, line_config),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Text payload.
    #[arg(long, conflicts_with = "file")]
    pub text: Option<String>,
    /// Read payload from file. Stdin is used when neither --text nor --file is given.
    #[arg(long, conflicts_with = "text")]
    pub file: Option<PathBuf>,
    /// Encode the payload as a binary message.
    #[arg(long)]
    pub binary: bool,
    /// Drop one trailing newline from the payload.
    #[arg(long)]
    pub chomp: bool,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Read frames from file instead of stdin.
    #[arg(long)]
    pub file: Option<PathBuf>,
    /// Exit with a failure code if any line fails to decode.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args, Debug)]
pub struct EchoArgs {
    /// Exit after echoing N messages.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
