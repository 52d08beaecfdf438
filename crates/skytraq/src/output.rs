use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use skytraq_frame::{message_name, Frame};
use skytraq_session::Ack;
use skytraq_transport::PortInfo;

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
    message_id: u8,
    message_name: &'a str,
    payload_len: usize,
    payload: String,
    checksum: u8,
    source: &'a str,
    timestamp: String,
}

#[derive(Serialize)]
struct AckOutput<'a> {
    acked: bool,
    message_id: u8,
    attempts: usize,
    port: &'a str,
    timestamp: String,
}

#[derive(Serialize)]
struct WireOutput {
    message_id: u8,
    length: usize,
    checksum: u8,
    wire: String,
}

#[derive(Serialize)]
struct PortOutput<'a> {
    name: &'a str,
    kind: &'a str,
    product: Option<&'a str>,
}

/// Print a received frame. `source` is the port name, or `-` for offline input.
pub fn print_frame(frame: &Frame, source: &str, format: OutputFormat) {
    let payload = hex::encode(&frame.payload);
    match format {
        OutputFormat::Json => {
            let out = FrameOutput {
                message_id: frame.message_id,
                message_name: message_name(frame.message_id),
                payload_len: frame.payload.len(),
                payload,
                checksum: frame.checksum(),
                source,
                timestamp: now_unix_seconds(),
            };
            print_json(&out);
        }
        OutputFormat::Table => {
            let mut table = new_table(vec!["ID", "TYPE", "SIZE", "SOURCE", "PAYLOAD"]);
            table.add_row(vec![
                format!("{:#04x}", frame.message_id),
                message_name(frame.message_id).to_string(),
                frame.payload.len().to_string(),
                source.to_string(),
                payload,
            ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "id={:#04x} ({}) size={} source={} payload={}",
                frame.message_id,
                message_name(frame.message_id),
                frame.payload.len(),
                source,
                payload
            );
        }
        OutputFormat::Raw => print_raw(frame.payload.as_ref()),
    }
}

pub fn print_ack(ack: &Ack, port: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = AckOutput {
                acked: true,
                message_id: ack.message_id,
                attempts: ack.attempts,
                port,
                timestamp: now_unix_seconds(),
            };
            print_json(&out);
        }
        OutputFormat::Table => {
            let mut table = new_table(vec!["ID", "RESULT", "ATTEMPTS", "PORT"]);
            table.add_row(vec![
                format!("{:#04x}", ack.message_id),
                "ACK".to_string(),
                ack.attempts.to_string(),
                port.to_string(),
            ]);
            println!("{table}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            println!(
                "id={:#04x} acked attempts={} port={}",
                ack.message_id, ack.attempts, port
            );
        }
    }
}

pub fn print_wire(frame: &Frame, wire: &[u8], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = WireOutput {
                message_id: frame.message_id,
                length: frame.length_field(),
                checksum: frame.checksum(),
                wire: hex::encode(wire),
            };
            print_json(&out);
        }
        OutputFormat::Table => {
            let mut table = new_table(vec!["ID", "LENGTH", "CHECKSUM", "WIRE"]);
            table.add_row(vec![
                format!("{:#04x}", frame.message_id),
                frame.length_field().to_string(),
                format!("{:#04x}", frame.checksum()),
                hex::encode(wire),
            ]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!("{}", spaced_hex(wire)),
        OutputFormat::Raw => print_raw(wire),
    }
}

pub fn print_ports(ports: &[PortInfo], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out: Vec<PortOutput<'_>> = ports
                .iter()
                .map(|p| PortOutput {
                    name: &p.name,
                    kind: p.kind,
                    product: p.product.as_deref(),
                })
                .collect();
            print_json(&out);
        }
        OutputFormat::Table => {
            let mut table = new_table(vec!["PORT", "TYPE", "PRODUCT"]);
            for p in ports {
                table.add_row(vec![
                    p.name.clone(),
                    p.kind.to_string(),
                    p.product.clone().unwrap_or_default(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            for p in ports {
                println!("{}", p.name);
            }
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn spaced_hex(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
