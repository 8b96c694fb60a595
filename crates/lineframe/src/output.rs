use std::io::{IsTerminal, Write};

use base64::{engine::general_purpose::STANDARD, Engine};
use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use lineframe_codec::Message;
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct MessageOutput<'a> {
    index: usize,
    kind: &'static str,
    size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    base64: Option<String>,
}

impl<'a> MessageOutput<'a> {
    fn new(message: &'a Message, index: usize) -> Self {
        Self {
            index,
            kind: message.kind(),
            size: message.len(),
            text: message.as_text(),
            base64: message.as_binary().map(|payload| STANDARD.encode(payload)),
        }
    }
}

pub fn render_json(message: &Message, index: usize) -> String {
    serde_json::to_string(&MessageOutput::new(message, index)).unwrap_or_else(|_| "{}".to_string())
}

pub fn print_message(message: &Message, index: usize, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!("{}", render_json(message, index));
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["#", "KIND", "SIZE", "PAYLOAD"])
                .add_row(vec![
                    index.to_string(),
                    message.kind().to_string(),
                    message.len().to_string(),
                    payload_preview(message),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "#{} kind={} size={} payload={}",
                index,
                message.kind(),
                message.len(),
                payload_preview(message)
            );
        }
        OutputFormat::Raw => match message {
            Message::Text(text) => print_raw(text.as_bytes()),
            Message::Binary(payload) => print_raw(payload),
        },
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn payload_preview(message: &Message) -> String {
    match message {
        Message::Text(text) => text.escape_debug().to_string(),
        Message::Binary(payload) => match std::str::from_utf8(payload) {
            Ok(text) => format!("<binary {} bytes> {}", payload.len(), text.escape_debug()),
            Err(_) => format!("<binary {} bytes>", payload.len()),
        },
    }
}
