use skytraq_frame::{FrameConfig, FrameReader, FrameWriter};
use skytraq_transport::{ChannelConfig, SerialChannel};
use tracing::debug;

use crate::error::Result;
use crate::session::{CommandSession, SessionConfig};

/// A session over a real serial port.
pub type SerialSession = CommandSession<SerialChannel, SerialChannel>;

/// Open a serial port and start a session with default configuration.
pub fn open(channel_config: &ChannelConfig) -> Result<SerialSession> {
    open_with_config(channel_config, SessionConfig::default())
}

/// Open with explicit session configuration.
///
/// The port handle is cloned so the reader and writer halves can be driven
/// independently; both are closed when the session is dropped.
pub fn open_with_config(
    channel_config: &ChannelConfig,
    session_config: SessionConfig,
) -> Result<SerialSession> {
    // Checked before the port is touched.
    session_config.validate()?;

    let channel = SerialChannel::open(channel_config)?;
    let reader_channel = channel.try_clone()?;

    let frame_config = FrameConfig {
        max_sync_attempts: session_config.max_sync_attempts,
        read_timeout: Some(channel_config.timeout),
    };

    let reader = FrameReader::with_config_serial(reader_channel, frame_config)?;
    let writer = FrameWriter::new(channel);

    debug!(
        port = %channel_config.port,
        max_ack_attempts = session_config.max_ack_attempts,
        max_sync_attempts = session_config.max_sync_attempts,
        "session ready"
    );

    CommandSession::from_parts(reader, writer, session_config)
}

impl SerialSession {
    /// Port name the session is talking to.
    pub fn port_name(&self) -> &str {
        self.writer().get_ref().name()
    }

    /// Bytes already received and waiting to be decoded.
    pub fn bytes_waiting(&self) -> Result<u32> {
        Ok(self.reader().get_ref().bytes_to_read()?)
    }
}
