use std::io::{Read, Write};

use skytraq_frame::{message_name, Frame, FrameError, FrameReader, FrameWriter};
use tracing::{debug, warn};

use crate::error::{Result, SessionError};

/// Default number of reply frames inspected while waiting for an ACK.
pub const DEFAULT_MAX_ACK_ATTEMPTS: usize = 5;

/// Session behavior configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Frames read after a command before giving up on its ACK. Every frame
    /// counts, including unrelated traffic and frames that fail to decode.
    pub max_ack_attempts: usize,
    /// Bytes scanned for the start marker on each frame read.
    pub max_sync_attempts: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_ack_attempts: DEFAULT_MAX_ACK_ATTEMPTS,
            max_sync_attempts: skytraq_frame::DEFAULT_MAX_SYNC_ATTEMPTS,
        }
    }
}

impl SessionConfig {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.max_ack_attempts == 0 {
            return Err(SessionError::InvalidConfig(
                "max_ack_attempts must be at least 1".to_string(),
            ));
        }
        // The marker itself is two bytes.
        if self.max_sync_attempts < 2 {
            return Err(SessionError::InvalidConfig(format!(
                "max_sync_attempts must be at least 2 (got {})",
                self.max_sync_attempts
            )));
        }
        Ok(())
    }
}

/// Where the last command ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No command sent yet.
    Idle,
    Sending,
    AwaitingReply,
    Acked,
    Nacked,
    Exhausted,
    Failed,
}

impl SessionState {
    /// True once a command has finished, successfully or not.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Acked | Self::Nacked | Self::Exhausted | Self::Failed
        )
    }
}

/// A successful command acknowledgment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ack {
    /// The acknowledged command id.
    pub message_id: u8,
    /// Reply frames inspected, including the ACK itself.
    pub attempts: usize,
}

/// One receiver conversation over an exclusively owned channel.
///
/// Commands are strictly sequential: `send` writes one frame and then reads
/// replies until the matching ACK/NACK or the attempt budget runs out. The
/// channel halves are released when the session is dropped.
#[derive(Debug)]
pub struct CommandSession<R, W> {
    reader: FrameReader<R>,
    writer: FrameWriter<W>,
    config: SessionConfig,
    state: SessionState,
}

impl<R: Read, W: Write> CommandSession<R, W> {
    /// Build a session over separate read and write halves with default configuration.
    pub fn new(reader: R, writer: W) -> Self {
        let mut reader = FrameReader::new(reader);
        let config = SessionConfig::default();
        reader.set_max_sync_attempts(config.max_sync_attempts);
        Self {
            reader,
            writer: FrameWriter::new(writer),
            config,
            state: SessionState::Idle,
        }
    }

    /// Build a session from an existing frame reader/writer pair.
    ///
    /// The reader's sync budget is overridden by `config.max_sync_attempts`.
    /// Fails with `InvalidConfig` if the configuration cannot work.
    pub fn from_parts(
        mut reader: FrameReader<R>,
        writer: FrameWriter<W>,
        config: SessionConfig,
    ) -> Result<Self> {
        config.validate()?;
        reader.set_max_sync_attempts(config.max_sync_attempts);
        Ok(Self {
            reader,
            writer,
            config,
            state: SessionState::Idle,
        })
    }

    /// Send a command and wait for the receiver to acknowledge it.
    ///
    /// The frame is written once. Up to `max_ack_attempts` frames are then
    /// read; decode failures and unrelated frames each use up one attempt.
    /// A channel failure other than a read timeout ends the call at once.
    pub fn send(&mut self, message_id: u8, payload: &[u8]) -> Result<Ack> {
        self.state = SessionState::Sending;
        if let Err(err) = self.writer.send(message_id, payload) {
            self.state = SessionState::Failed;
            return Err(err.into());
        }

        self.state = SessionState::AwaitingReply;
        let max_attempts = self.config.max_ack_attempts;
        let mut last_error = None;

        for attempt in 1..=max_attempts {
            match self.reader.read_frame() {
                Ok(frame) if frame.is_nack_for(message_id) => {
                    self.state = SessionState::Nacked;
                    warn!(
                        message_id = format_args!("{message_id:#04x}"),
                        attempt, "receiver sent NACK"
                    );
                    return Err(SessionError::CommandRejected {
                        message_id,
                        attempt,
                    });
                }
                Ok(frame) if frame.is_ack_for(message_id) => {
                    self.state = SessionState::Acked;
                    debug!(
                        message_id = format_args!("{message_id:#04x}"),
                        attempt, "receiver sent ACK"
                    );
                    return Ok(Ack {
                        message_id,
                        attempts: attempt,
                    });
                }
                Ok(frame) => log_unexpected(&frame, attempt),
                Err(err) if is_recoverable(&err) => {
                    warn!(attempt, max_attempts, error = %err, "decode failed while awaiting ACK");
                    last_error = Some(err.to_string());
                }
                Err(err) => {
                    self.state = SessionState::Failed;
                    return Err(err.into());
                }
            }
        }

        self.state = SessionState::Exhausted;
        Err(SessionError::AckTimeout {
            message_id,
            attempts: max_attempts,
            last_error,
        })
    }

    /// Send a command, require its ACK, then wait for the reply message.
    ///
    /// Query commands are answered with an ACK followed by a separate frame
    /// carrying `reply_id`. Frames read while waiting for the reply use up
    /// the same `max_ack_attempts` budget as the ACK wait.
    pub fn query(&mut self, message_id: u8, payload: &[u8], reply_id: u8) -> Result<Frame> {
        self.send(message_id, payload)?;

        let max_attempts = self.config.max_ack_attempts;
        for attempt in 1..=max_attempts {
            match self.reader.read_frame() {
                Ok(frame) if frame.message_id == reply_id => return Ok(frame),
                Ok(frame) => log_unexpected(&frame, attempt),
                Err(err) if is_recoverable(&err) => {
                    warn!(attempt, max_attempts, error = %err, "decode failed while awaiting reply");
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(SessionError::ReplyTimeout {
            reply_id,
            attempts: max_attempts,
        })
    }

    /// Receive exactly one frame (blocking).
    ///
    /// Unlike the ACK wait, every decode failure is returned to the caller.
    pub fn recv(&mut self) -> Result<Frame> {
        self.reader.read_frame().map_err(Into::into)
    }

    /// State the last command finished in.
    pub fn last_state(&self) -> SessionState {
        self.state
    }

    /// Session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Borrow the frame reader.
    pub fn reader(&self) -> &FrameReader<R> {
        &self.reader
    }

    /// Borrow the frame writer.
    pub fn writer(&self) -> &FrameWriter<W> {
        &self.writer
    }

    /// Consume the session and return its channel halves.
    pub fn into_parts(self) -> (FrameReader<R>, FrameWriter<W>) {
        (self.reader, self.writer)
    }
}

/// Decode failures that use up an attempt instead of ending the wait.
fn is_recoverable(err: &FrameError) -> bool {
    !err.is_channel_error() || err.is_timeout()
}

fn log_unexpected(frame: &Frame, attempt: usize) {
    debug!(
        attempt,
        message_id = format_args!("{:#04x}", frame.message_id),
        kind = message_name(frame.message_id),
        payload = %hex::encode(&frame.payload),
        "received unexpected frame"
    );
}
