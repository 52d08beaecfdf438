//! Reserved message ids.
//!
//! The receiver answers every command with one of two response frames whose
//! single payload byte is the id of the command being answered. All other
//! ids are opaque to this crate.

/// Command accepted.
pub const ACK: u8 = 0x83;

/// Command rejected.
pub const NACK: u8 = 0x84;

/// Returns a human-readable name for a message id.
pub fn message_name(id: u8) -> &'static str {
    match id {
        ACK => "ACK",
        NACK => "NACK",
        _ => "MESSAGE",
    }
}

/// Returns true if the id is one of the reserved ACK/NACK responses.
pub fn is_response(id: u8) -> bool {
    matches!(id, ACK | NACK)
}
