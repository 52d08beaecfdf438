//! SkyTraq binary message framing.
//!
//! This is the core layer of skytraq. Every message is framed with:
//! - A 2-byte start marker (`0xA0 0xA1`) for stream synchronization
//! - A 2-byte big-endian length covering the message id and payload
//! - A 1-byte message id followed by the payload
//! - A 1-byte XOR checksum of the message id and payload
//! - A 2-byte trailer (`0x0D 0x0A`)
//!
//! Readers scan byte-by-byte for the start marker, so frames can be picked
//! out of a noisy serial stream (NMEA text, partial frames, line garbage).

pub mod codec;
pub mod error;
pub mod message;
pub mod reader;
pub mod writer;

pub use codec::{
    checksum, encode_frame, Frame, FrameConfig, DEFAULT_MAX_SYNC_ATTEMPTS, HEADER_SIZE,
    MAX_PAYLOAD, SYNC, TRAILER,
};
pub use error::{FrameError, Result};
pub use message::{message_name, ACK, NACK};
pub use reader::{decode_frame, FrameReader};
pub use writer::FrameWriter;
