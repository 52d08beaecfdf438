/// Errors that can occur in serial transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The requested port does not exist.
    #[error("serial port not found: {0}")]
    PortNotFound(String),

    /// The process lacks permission to open the port.
    #[error("permission denied opening serial port: {0}")]
    PermissionDenied(String),

    /// The port exists but could not be opened or configured.
    #[error("failed to open {port}: {source}")]
    Open {
        port: String,
        source: serialport::Error,
    },

    /// A serial port control operation failed (timeouts, clone, buffer queries).
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// An I/O error occurred on the channel.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration cannot be applied to a serial port.
    #[error("invalid channel configuration: {0}")]
    InvalidConfig(String),
}

impl TransportError {
    /// Classify a `serialport` open failure for `port`.
    pub(crate) fn from_open(port: &str, err: serialport::Error) -> Self {
        match err.kind() {
            serialport::ErrorKind::NoDevice => Self::PortNotFound(port.to_string()),
            serialport::ErrorKind::Io(std::io::ErrorKind::NotFound) => {
                Self::PortNotFound(port.to_string())
            }
            serialport::ErrorKind::Io(std::io::ErrorKind::PermissionDenied) => {
                Self::PermissionDenied(port.to_string())
            }
            _ => Self::Open {
                port: port.to_string(),
                source: err,
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;
