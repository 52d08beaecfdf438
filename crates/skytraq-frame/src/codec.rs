use std::time::Duration;

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};
use crate::message::{ACK, NACK};

/// Start-of-frame marker.
pub const SYNC: [u8; 2] = [0xA0, 0xA1];

/// End-of-frame trailer (`\r\n`).
pub const TRAILER: [u8; 2] = [0x0D, 0x0A];

/// Frame header: sync (2) + length (2) = 4 bytes.
pub const HEADER_SIZE: usize = 4;

/// Checksum (1) + trailer (2).
const FOOTER_SIZE: usize = 3;

/// Largest payload whose length field (`payload + 1`) still fits in a `u16`.
pub const MAX_PAYLOAD: usize = u16::MAX as usize - 1;

/// Default byte budget when scanning for the start marker.
pub const DEFAULT_MAX_SYNC_ATTEMPTS: usize = 256;

/// A decoded message: one id byte plus opaque payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Message id (`0x83` ACK, `0x84` NACK, anything else is a command or reply).
    pub message_id: u8,
    /// The message payload, not including the id byte.
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(message_id: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            message_id,
            payload: payload.into(),
        }
    }

    /// The total wire size of this frame.
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + 1 + self.payload.len() + FOOTER_SIZE
    }

    /// Value of the length field for this frame.
    pub fn length_field(&self) -> usize {
        self.payload.len() + 1
    }

    /// Checksum byte this frame carries on the wire.
    pub fn checksum(&self) -> u8 {
        checksum(self.message_id, &self.payload)
    }

    /// Encode into a freshly allocated wire buffer.
    pub fn encode(&self) -> Result<Bytes> {
        let mut dst = BytesMut::with_capacity(self.wire_size());
        encode_frame(self.message_id, &self.payload, &mut dst)?;
        Ok(dst.freeze())
    }

    /// The id this ACK/NACK refers to, if the frame is one.
    pub fn acknowledged_id(&self) -> Option<u8> {
        match self.message_id {
            ACK | NACK => self.payload.first().copied(),
            _ => None,
        }
    }

    /// True if this is an ACK for `message_id`.
    pub fn is_ack_for(&self, message_id: u8) -> bool {
        self.message_id == ACK && self.acknowledged_id() == Some(message_id)
    }

    /// True if this is a NACK for `message_id`.
    pub fn is_nack_for(&self, message_id: u8) -> bool {
        self.message_id == NACK && self.acknowledged_id() == Some(message_id)
    }
}

/// XOR-fold of the message id and every payload byte.
pub fn checksum(message_id: u8, payload: &[u8]) -> u8 {
    payload.iter().fold(message_id, |acc, b| acc ^ b)
}

/// Encode a message into the wire format.
///
/// Wire format:
/// ```text
/// ┌───────────┬────────────┬────────┬──────────────┬──────────┬───────────┐
/// │ Sync (2B) │ Length     │ Msg ID │ Payload      │ Checksum │ Trailer   │
/// │ 0xA0 0xA1 │ (2B BE)    │ (1B)   │ (Length - 1) │ (1B XOR) │ 0x0D 0x0A │
/// └───────────┴────────────┴────────┴──────────────┴──────────┴───────────┘
/// ```
///
/// An empty payload is valid and produces a length field of 1.
pub fn encode_frame(message_id: u8, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    if payload.len() > MAX_PAYLOAD {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_PAYLOAD,
        });
    }
    dst.reserve(HEADER_SIZE + 1 + payload.len() + FOOTER_SIZE);
    dst.put_slice(&SYNC);
    dst.put_u16(payload.len() as u16 + 1);
    dst.put_u8(message_id);
    dst.put_slice(payload);
    dst.put_u8(checksum(message_id, payload));
    dst.put_slice(&TRAILER);
    Ok(())
}

/// Configuration for frame readers.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Bytes a reader may consume looking for the start marker. Default: 256.
    pub max_sync_attempts: usize,
    /// Read timeout applied to the channel when the reader is built over a
    /// serial port. `None` keeps the port's configured timeout.
    pub read_timeout: Option<Duration>,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_sync_attempts: DEFAULT_MAX_SYNC_ATTEMPTS,
            read_timeout: None,
        }
    }
}
