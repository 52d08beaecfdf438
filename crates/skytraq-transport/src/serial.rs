use std::io::{Read, Write};
use std::time::Duration;

use serialport::{SerialPort, SerialPortType};
use tracing::{debug, info};

use crate::config::ChannelConfig;
use crate::error::{Result, TransportError};

/// An open serial port, the byte channel for one receiver.
///
/// Implements `Read + Write`. Reads block up to the configured timeout and
/// then fail with `ErrorKind::TimedOut`. The port is closed when the last
/// handle (including clones from [`SerialChannel::try_clone`]) is dropped.
pub struct SerialChannel {
    port: Box<dyn SerialPort>,
    name: String,
}

impl SerialChannel {
    /// Open and configure a serial port (blocking).
    pub fn open(config: &ChannelConfig) -> Result<Self> {
        config.validate()?;

        let port = serialport::new(&config.port, config.baud_rate)
            .data_bits(config.data_bits)
            .stop_bits(config.stop_bits)
            .parity(config.parity)
            .flow_control(config.flow_control)
            .timeout(config.timeout)
            .open()
            .map_err(|err| TransportError::from_open(&config.port, err))?;

        info!(
            port = %config.port,
            baud_rate = config.baud_rate,
            timeout = ?config.timeout,
            "opened serial port"
        );

        Ok(Self {
            port,
            name: config.port.clone(),
        })
    }

    /// Port name this channel was opened with.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the blocking timeout for reads on this handle.
    pub fn set_read_timeout(&mut self, timeout: Duration) -> Result<()> {
        self.port.set_timeout(timeout).map_err(Into::into)
    }

    /// Number of received bytes waiting in the input buffer.
    pub fn bytes_to_read(&self) -> Result<u32> {
        self.port.bytes_to_read().map_err(Into::into)
    }

    /// Clone the handle (new file descriptor to the same port).
    ///
    /// Used to split one port into independent reader and writer halves.
    pub fn try_clone(&self) -> Result<Self> {
        let port = self.port.try_clone()?;
        debug!(port = %self.name, "cloned serial port handle");
        Ok(Self {
            port,
            name: self.name.clone(),
        })
    }
}

impl Read for SerialChannel {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.port.read(buf)
    }
}

impl Write for SerialChannel {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.port.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.port.flush()
    }
}

impl std::fmt::Debug for SerialChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialChannel")
            .field("port", &self.name)
            .finish()
    }
}

/// A serial port visible to the system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortInfo {
    pub name: String,
    /// `usb`, `pci`, `bluetooth` or `unknown`.
    pub kind: &'static str,
    /// USB product string, when the port is a USB adapter that reports one.
    pub product: Option<String>,
}

/// Enumerate serial ports.
pub fn available_ports() -> Result<Vec<PortInfo>> {
    let ports = serialport::available_ports()?;
    Ok(ports
        .into_iter()
        .map(|p| {
            let (kind, product) = match p.port_type {
                SerialPortType::UsbPort(usb) => ("usb", usb.product),
                SerialPortType::PciPort => ("pci", None),
                SerialPortType::BluetoothPort => ("bluetooth", None),
                SerialPortType::Unknown => ("unknown", None),
            };
            PortInfo {
                name: p.port_name,
                kind,
                product,
            }
        })
        .collect())
}
