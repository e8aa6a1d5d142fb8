use std::fmt::Write as _;
use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
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
struct FrameOutput<'a> {
    sequence: usize,
    payload_size: usize,
    payload: String,
    peer: &'a str,
    timestamp: String,
}

#[derive(Serialize)]
struct EncodedOutput<'a> {
    byte_order: &'a str,
    frame_size: usize,
    payload_size: usize,
    hex: String,
}

/// Print one received payload.
pub fn print_frame(sequence: usize, payload: &[u8], peer: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = FrameOutput {
                sequence,
                payload_size: payload.len(),
                payload: payload_preview(payload),
                peer,
                timestamp: now_unix_seconds(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["#", "SIZE", "PEER", "PAYLOAD"])
                .add_row(vec![
                    sequence.to_string(),
                    payload.len().to_string(),
                    peer.to_string(),
                    payload_preview(payload),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "#{} size={} peer={} payload={}",
                sequence,
                payload.len(),
                peer,
                payload_preview(payload)
            );
        }
        OutputFormat::Raw => print_raw(payload),
    }
}

/// Print an encoded wire frame.
pub fn print_encoded(frame: &[u8], header_size: usize, byte_order: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = EncodedOutput {
                byte_order,
                frame_size: frame.len(),
                payload_size: frame.len().saturating_sub(header_size),
                hex: hex(frame),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let (header, payload) = frame.split_at(header_size.min(frame.len()));
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["ORDER", "HEADER", "PAYLOAD"])
                .add_row(vec![byte_order.to_string(), hex(header), hex(payload)]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!("{}", hex(frame)),
        OutputFormat::Raw => print_raw(frame),
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

/// Space-separated lowercase hex, e.g. `03 00 41`.
pub fn hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for (i, byte) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{byte:02x}");
    }
    out
}

fn payload_preview(payload: &[u8]) -> String {
    match std::str::from_utf8(payload) {
        Ok(text) => text.to_string(),
        Err(_) => format!("<binary {} bytes>", payload.len()),
    }
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
