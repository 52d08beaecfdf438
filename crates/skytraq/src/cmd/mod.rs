use std::time::Duration;

use clap::{Args, Subcommand};
use skytraq_session::{open_with_config, SerialSession, SessionConfig, DEFAULT_MAX_ACK_ATTEMPTS};
use skytraq_transport::{ChannelConfig, DEFAULT_BAUD_RATE};
use tracing::debug;

use crate::exit::{session_error, CliError, CliResult, USAGE};
use crate::output::{print_frame, OutputFormat};

pub mod decode;
pub mod encode;
pub mod listen;
pub mod ports;
pub mod query;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send a command and wait for its ACK.
    Send(SendArgs),
    /// Send a query command and print the reply message.
    Query(QueryArgs),
    /// Print frames received from the port.
    Listen(ListenArgs),
    /// Print the wire bytes for a message without opening a port.
    Encode(EncodeArgs),
    /// Decode one frame from hex bytes.
    Decode(DecodeArgs),
    /// List serial ports.
    Ports,
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Send(args) => send::run(args, format),
        Command::Query(args) => query::run(args, format),
        Command::Listen(args) => listen::run(args, format),
        Command::Encode(args) => encode::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Ports => ports::run(format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct PortArgs {
    /// Serial port (e.g. /dev/ttyUSB0, COM3).
    #[arg(long, short = 'p', env = "SKYTRAQ_PORT")]
    pub port: String,
    /// Baud rate.
    #[arg(long, short = 'b', default_value_t = DEFAULT_BAUD_RATE)]
    pub baud: u32,
    /// Read timeout (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub timeout: String,
}

#[derive(Args, Debug)]
pub struct SessionArgs {
    /// Frames to inspect while waiting for an ACK.
    #[arg(long, default_value_t = DEFAULT_MAX_ACK_ATTEMPTS)]
    pub max_ack_attempts: usize,
    /// Bytes to scan for the start marker per frame.
    #[arg(long, default_value_t = skytraq_frame::DEFAULT_MAX_SYNC_ATTEMPTS)]
    pub max_sync_attempts: usize,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Message id (decimal or 0x-prefixed hex).
    #[arg(value_parser = parse_message_id)]
    pub message_id: u8,
    /// Payload as hex bytes (e.g. 0201).
    #[arg(long, default_value = "")]
    pub payload: String,
    /// Print frames already waiting on the port before sending.
    #[arg(long)]
    pub drain: bool,
    #[command(flatten)]
    pub port: PortArgs,
    #[command(flatten)]
    pub session: SessionArgs,
}

#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Message id (decimal or 0x-prefixed hex).
    #[arg(value_parser = parse_message_id)]
    pub message_id: u8,
    /// Message id of the expected reply.
    #[arg(long, value_parser = parse_message_id)]
    pub reply_id: u8,
    /// Payload as hex bytes.
    #[arg(long, default_value = "")]
    pub payload: String,
    #[command(flatten)]
    pub port: PortArgs,
    #[command(flatten)]
    pub session: SessionArgs,
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    /// Only print frames with these message ids (comma-separated).
    #[arg(long, value_delimiter = ',', value_parser = parse_message_id)]
    pub ids: Option<Vec<u8>>,
    /// Exit after receiving N frames.
    #[arg(long)]
    pub count: Option<usize>,
    #[command(flatten)]
    pub port: PortArgs,
    #[command(flatten)]
    pub session: SessionArgs,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Message id (decimal or 0x-prefixed hex).
    #[arg(value_parser = parse_message_id)]
    pub message_id: u8,
    /// Payload as hex bytes.
    #[arg(long, default_value = "")]
    pub payload: String,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Frame bytes as hex. Leading noise is skipped.
    pub hex: String,
    /// Bytes to scan for the start marker.
    #[arg(long, default_value_t = skytraq_frame::DEFAULT_MAX_SYNC_ATTEMPTS)]
    pub max_sync_attempts: usize,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub(crate) fn parse_message_id(input: &str) -> Result<u8, String> {
    let input = input.trim();
    let parsed = match input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
    {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => input.parse(),
    };
    parsed.map_err(|_| format!("invalid message id: {input} (expected 0-255 or 0x00-0xff)"))
}

pub(crate) fn parse_payload(input: &str) -> CliResult<Vec<u8>> {
    let compact: String = input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .collect();
    hex::decode(&compact)
        .map_err(|err| CliError::new(USAGE, format!("payload is not valid hex: {err}")))
}

pub(crate) fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}

pub(crate) fn open_session(port: &PortArgs, session: &SessionArgs) -> CliResult<SerialSession> {
    let timeout = parse_duration(&port.timeout)?;
    let channel_config = ChannelConfig::new(port.port.clone(), port.baud).with_timeout(timeout);
    let session_config = SessionConfig {
        max_ack_attempts: session.max_ack_attempts,
        max_sync_attempts: session.max_sync_attempts,
    };
    open_with_config(&channel_config, session_config)
        .map_err(|err| session_error(&format!("open {} failed", port.port), err))
}

/// Print every frame the receiver has already queued. Stops at the first
/// decode failure; whatever is left is handled by the next ACK wait.
pub(crate) fn drain_pending(session: &mut SerialSession, format: OutputFormat) -> CliResult<usize> {
    let mut drained = 0usize;
    loop {
        let waiting = session
            .bytes_waiting()
            .map_err(|err| session_error("query port failed", err))?;
        if waiting == 0 {
            break;
        }
        match session.recv() {
            Ok(frame) => {
                print_frame(&frame, session.port_name(), format);
                drained += 1;
            }
            Err(err) => {
                debug!(error = %err, "stopped draining");
                break;
            }
        }
    }
    Ok(drained)
}
