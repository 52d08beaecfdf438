//! Driver for the SkyTraq GPS receiver binary protocol.
//!
//! skytraq talks to Venus-family receivers over a serial link: it frames
//! commands, finds replies in the byte stream, and runs the
//! command/acknowledgment handshake with bounded retry.
//!
//! # Crate Structure
//!
//! - [`transport`] — Serial byte channel
//! - [`frame`] — Message framing (sync marker, length, XOR checksum, trailer)
//! - [`session`] — Command sessions with ACK/NACK handling (behind `session` feature)

/// Re-export transport types.
pub mod transport {
    pub use skytraq_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use skytraq_frame::*;
}

/// Re-export session types (requires `session` feature).
#[cfg(feature = "session")]
pub mod session {
    pub use skytraq_session::*;
}
