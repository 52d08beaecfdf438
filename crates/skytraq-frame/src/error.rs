use std::io::ErrorKind;

use bytes::Bytes;

/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// No start marker was found within the byte budget.
    #[error(
        "no frame start marker after reading {attempts} bytes (discarded: {})",
        hex::encode(.discarded)
    )]
    SyncTimeout { attempts: usize, discarded: Bytes },

    /// The length field cannot describe a frame (it must count the id byte).
    #[error("invalid frame length {0} (must be at least 1)")]
    InvalidLength(u16),

    /// The received checksum disagrees with the one computed over id and payload.
    #[error("checksum mismatch (computed {expected:#04x}, received {actual:#04x})")]
    ChecksumMismatch { expected: u8, actual: u8 },

    /// The frame did not end with `0x0D 0x0A`.
    #[error("invalid frame trailer {:#04x} {:#04x} (expected 0x0d 0x0a)", .0[0], .0[1])]
    InvalidTrailer([u8; 2]),

    /// The payload cannot be represented by the 16-bit length field.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The channel ended in the middle of a frame.
    #[error("short read (expected {expected} bytes, got {got})")]
    ShortRead { expected: usize, got: usize },

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The channel was closed before a frame started.
    #[error("connection closed")]
    ConnectionClosed,
}

impl FrameError {
    /// Transport-level failure: timeout, disconnect or short read.
    pub fn is_channel_error(&self) -> bool {
        matches!(
            self,
            Self::Io(_) | Self::ShortRead { .. } | Self::ConnectionClosed
        )
    }

    /// The channel's read timeout expired.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::Io(err) if matches!(err.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock)
        )
    }

    /// Structurally invalid frame (length, checksum or trailer).
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Self::InvalidLength(_) | Self::ChecksumMismatch { .. } | Self::InvalidTrailer(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
