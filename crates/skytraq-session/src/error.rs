use skytraq_frame::FrameError;

/// Errors that can occur in session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Opening or configuring the channel failed.
    #[error("transport error: {0}")]
    Transport(#[from] skytraq_transport::TransportError),

    /// Frame-level error: channel failure, or a malformed frame on a standalone receive.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// The receiver answered with a NACK for the command.
    #[error("receiver rejected message {message_id:#04x} (NACK on attempt {attempt})")]
    CommandRejected { message_id: u8, attempt: usize },

    /// No matching ACK or NACK within the attempt budget.
    #[error(
        "no ACK for message {message_id:#04x} after {attempts} attempts{}",
        last_error_suffix(.last_error)
    )]
    AckTimeout {
        message_id: u8,
        attempts: usize,
        /// The last decode failure seen while waiting, if any.
        last_error: Option<String>,
    },

    /// The command was acknowledged but its reply never arrived.
    #[error("no reply {reply_id:#04x} after {attempts} attempts")]
    ReplyTimeout { reply_id: u8, attempts: usize },

    /// The session configuration cannot work.
    #[error("invalid session configuration: {0}")]
    InvalidConfig(String),
}

impl SessionError {
    /// True if the underlying channel failed (closed, timed out, short read).
    pub fn is_channel_error(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Frame(err) => err.is_channel_error(),
            _ => false,
        }
    }
}

fn last_error_suffix(last_error: &Option<String>) -> String {
    match last_error {
        Some(err) => format!(" (last error: {err})"),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ack_timeout_mentions_last_error() {
        let err = SessionError::AckTimeout {
            message_id: 0x09,
            attempts: 5,
            last_error: Some("checksum mismatch".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "no ACK for message 0x09 after 5 attempts (last error: checksum mismatch)"
        );

        let quiet = SessionError::AckTimeout {
            message_id: 0x09,
            attempts: 5,
            last_error: None,
        };
        assert_eq!(quiet.to_string(), "no ACK for message 0x09 after 5 attempts");
    }

    #[test]
    fn channel_error_classification() {
        let closed = SessionError::Frame(FrameError::ConnectionClosed);
        assert!(closed.is_channel_error());

        let malformed = SessionError::Frame(FrameError::InvalidLength(0));
        assert!(!malformed.is_channel_error());

        let rejected = SessionError::CommandRejected {
            message_id: 0x09,
            attempt: 1,
        };
        assert!(!rejected.is_channel_error());
    }
}
