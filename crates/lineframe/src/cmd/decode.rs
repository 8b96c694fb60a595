use std::fs::File;

use lineframe_codec::{DecodeOutcome, LineDecoder, Message};
use lineframe_transport::{LineConfig, LineReader, Source};

use crate::cmd::DecodeArgs;
use crate::exit::{io_error, transport_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_message, OutputFormat};

#[derive(Debug, Default, PartialEq, Eq)]
struct DecodeSummary {
    messages: usize,
    errors: usize,
    discarded_lines: usize,
}

pub fn run(args: DecodeArgs, format: OutputFormat, line_config: LineConfig) -> CliResult<i32> {
    let print = |message: &Message, index: usize| print_message(message, index, format);
    let summary = match &args.file {
        Some(path) => {
            let file = File::open(path)
                .map_err(|err| io_error(&format!("failed opening {}", path.display()), err))?;
            decode_stream(LineReader::with_config(file, line_config), print)?
        }
        None => decode_stream(
            LineReader::with_config(std::io::stdin(), line_config),
            print,
        )?,
    };

    tracing::debug!(
        messages = summary.messages,
        errors = summary.errors,
        "decode finished"
    );

    if args.strict && summary.errors > 0 {
        return Err(CliError::new(
            DATA_INVALID,
            format!("{} line(s) failed to decode", summary.errors),
        ));
    }
    Ok(SUCCESS)
}

fn decode_stream<S, F>(mut source: S, mut emit: F) -> CliResult<DecodeSummary>
where
    S: Source,
    F: FnMut(&Message, usize),
{
    let mut decoder = LineDecoder::new();
    let mut summary = DecodeSummary::default();
    let mut line_number = 0usize;

    while let Some(line) = source
        .next_line()
        .map_err(|err| transport_error("read failed", err))?
    {
        line_number += 1;
        match decoder.feed(&line) {
            DecodeOutcome::Continue => {}
            DecodeOutcome::Emit(message) => {
                emit(&message, summary.messages);
                summary.messages += 1;
            }
            DecodeOutcome::Error(err) => {
                tracing::warn!(line = line_number, error = %err, "failed to decode line");
                summary.errors += 1;
            }
        }
    }

    if !decoder.is_idle() {
        summary.discarded_lines = decoder.pending_lines();
        tracing::warn!(
            lines = summary.discarded_lines,
            "input ended inside a multi-line message"
        );
    }
    Ok(summary)
}
