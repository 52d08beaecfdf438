//! Command sessions for SkyTraq receivers.
//!
//! This is the "just works" layer. Open a port, send a command, and get
//! back either the receiver's ACK or a typed error explaining why not.

pub mod connector;
pub mod error;
pub mod session;

pub use connector::{open, open_with_config, SerialSession};
pub use error::{Result, SessionError};
pub use session::{Ack, CommandSession, SessionConfig, SessionState, DEFAULT_MAX_ACK_ATTEMPTS};
