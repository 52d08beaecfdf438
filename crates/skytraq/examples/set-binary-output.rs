//! Switch a receiver's output to binary messages.
//!
//! Run with:
//!   cargo run --example set-binary-output -- /dev/ttyUSB0
//!
//! Any reply already waiting on the port is printed first, then message
//! 0x09 (configure message type) is sent with payload `02 01`
//! (binary output, write to SRAM and flash).

use skytraq::session::open;
use skytraq::transport::{ChannelConfig, DEFAULT_BAUD_RATE};

const CONFIGURE_MESSAGE_TYPE: u8 = 0x09;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let port = std::env::args()
        .nth(1)
        .unwrap_or_else(|| ChannelConfig::default().port);

    let mut session = open(&ChannelConfig::new(port, DEFAULT_BAUD_RATE))?;
    eprintln!("Opened {}", session.port_name());

    if session.bytes_waiting()? > 0 {
        let frame = session.recv()?;
        eprintln!(
            "Pending message {:#04x}: {} payload bytes",
            frame.message_id,
            frame.payload.len()
        );
    }

    let ack = session.send(CONFIGURE_MESSAGE_TYPE, &[0x02, 0x01])?;
    eprintln!(
        "Receiver acknowledged {:#04x} after {} frame(s)",
        ack.message_id, ack.attempts
    );

    Ok(())
}
