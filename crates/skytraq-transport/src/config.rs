use std::time::Duration;

use serialport::{DataBits, FlowControl, Parity, StopBits};

/// Factory default baud rate of SkyTraq Venus receivers.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Default blocking timeout for every port operation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Serial channel configuration.
///
/// The timeout is fixed at open time and applies to every blocking read and
/// write on the port. The protocol layers never vary it per call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelConfig {
    /// Port name (e.g. `COM3`, `/dev/ttyUSB0`).
    pub port: String,
    /// Line speed in bits per second.
    pub baud_rate: u32,
    pub data_bits: DataBits,
    pub stop_bits: StopBits,
    pub parity: Parity,
    pub flow_control: FlowControl,
    /// Blocking timeout for reads and writes.
    pub timeout: Duration,
}

impl ChannelConfig {
    /// Create a configuration for `port` with 8N1 framing and default timeout.
    pub fn new(port: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            port: port.into(),
            baud_rate,
            data_bits: DataBits::Eight,
            stop_bits: StopBits::One,
            parity: Parity::None,
            flow_control: FlowControl::None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the blocking timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the line speed.
    #[must_use]
    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    pub(crate) fn validate(&self) -> crate::Result<()> {
        if self.port.trim().is_empty() {
            return Err(crate::TransportError::InvalidConfig(
                "port name must not be empty".to_string(),
            ));
        }
        if self.baud_rate == 0 {
            return Err(crate::TransportError::InvalidConfig(
                "baud rate must be greater than zero".to_string(),
            ));
        }
        if self.timeout.is_zero() {
            return Err(crate::TransportError::InvalidConfig(
                "timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        #[cfg(windows)]
        let port = "COM3";
        #[cfg(not(windows))]
        let port = "/dev/ttyUSB0";
        Self::new(port, DEFAULT_BAUD_RATE)
    }
}
