use std::fs;
use std::io::Read;

use lineframe_codec::{encode_binary, encode_text};

use crate::cmd::EncodeArgs;
use crate::exit::{io_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::print_raw;

pub fn run(args: EncodeArgs) -> CliResult<i32> {
    let payload = resolve_payload(&args)?;
    let frame = build_frame(payload, args.binary, args.chomp)?;
    tracing::debug!(wire_size = frame.len(), binary = args.binary, "encoded frame");
    print_raw(&frame);
    Ok(SUCCESS)
}

fn resolve_payload(args: &EncodeArgs) -> CliResult<Vec<u8>> {
    if let Some(text) = &args.text {
        return Ok(text.as_bytes().to_vec());
    }
    if let Some(path) = &args.file {
        return fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err));
    }
    let mut payload = Vec::new();
    std::io::stdin()
        .read_to_end(&mut payload)
        .map_err(|err| io_error("failed reading stdin", err))?;
    Ok(payload)
}

fn build_frame(mut payload: Vec<u8>, binary: bool, chomp: bool) -> CliResult<Vec<u8>> {
    if chomp && payload.last() == Some(&b'\n') {
        payload.pop();
    }
    if binary {
        return Ok(encode_binary(&payload).to_vec());
    }
    let text = String::from_utf8(payload).map_err(|err| {
        CliError::new(
            DATA_INVALID,
            format!("payload is not valid UTF-8 (use --binary): {err}"),
        )
    })?;
    Ok(encode_text(&text).to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_payload_is_escaped() {
        let frame = build_frame(b"#message".to_vec(), false, false).unwrap();
        assert_eq!(frame, b"##message\n");
    }

    #[test]
    fn chomp_keeps_single_line_payload_single_line() {
        assert_eq!(
            build_frame(b"hello\n".to_vec(), false, true).unwrap(),
            b"hello\n"
        );
        assert_eq!(
            build_frame(b"hello\n".to_vec(), false, false).unwrap(),
            b"@hello\n\n.\n"
        );
    }

    #[test]
    fn binary_payload_is_base64() {
        assert_eq!(
            build_frame(vec![1, 2, 3], true, false).unwrap(),
            b"$AQID\n"
        );
    }

    #[test]
    fn invalid_utf8_text_is_rejected() {
        let err = build_frame(vec![0xff], false, false).unwrap_err();
        assert_eq!(err.code, DATA_INVALID);
    }
}
