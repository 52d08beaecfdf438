//! Byte channel transport for SkyTraq receivers.
//!
//! The protocol layers above only need a blocking `Read + Write` stream with
//! a fixed read timeout. This crate provides that over a serial port:
//! - [`ChannelConfig`] describes the port (name, baud rate, line settings, timeout)
//! - [`SerialChannel`] is the opened port, implementing `Read + Write`
//!
//! This is the lowest layer of skytraq. Everything else builds on top of
//! the [`SerialChannel`] type provided here.

pub mod config;
pub mod error;
pub mod serial;

pub use config::{ChannelConfig, DEFAULT_BAUD_RATE, DEFAULT_TIMEOUT};
pub use error::{Result, TransportError};
pub use serial::{available_ports, PortInfo, SerialChannel};
