use std::fmt;
use std::io;

use framewire_frame::FrameError;
use framewire_transport::TransportError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::ConnectionRefused | io::ErrorKind::NotFound => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Bind { source, .. }
        | TransportError::Connect { source, .. }
        | TransportError::Accept(source)
        | TransportError::Io(source) => io_error(context, source),
        TransportError::Closed => CliError::new(FAILURE, format!("{context}: {err}")),
        other => CliError::new(TRANSPORT_ERROR, format!("{context}: {other}")),
    }
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Transport(err) => transport_error(context, err),
        FrameError::BufferTooSmall { .. }
        | FrameError::FrameTooLarge { .. }
        | FrameError::PayloadTooLarge { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeouts_map_to_124() {
        let err = frame_error(
            "receive failed",
            FrameError::Transport(TransportError::Io(io::Error::from(
                io::ErrorKind::WouldBlock,
            ))),
        );
        assert_eq!(err.code, TIMEOUT);
        assert!(err.message.starts_with("receive failed: "));
    }

    #[test]
    fn oversized_frames_are_data_invalid() {
        let err = frame_error(
            "receive failed",
            FrameError::FrameTooLarge {
                declared: 100,
                capacity: 10,
            },
        );
        assert_eq!(err.code, DATA_INVALID);
    }

    #[test]
    fn missing_socket_is_plain_failure() {
        let err = transport_error(
            "connect failed",
            TransportError::Connect {
                path: "/nonexistent.sock".into(),
                source: io::Error::from(io::ErrorKind::NotFound),
            },
        );
        assert_eq!(err.code, FAILURE);
    }

    #[test]
    fn buffer_range_errors_are_transport_errors() {
        let err = transport_error(
            "send failed",
            TransportError::OutOfBounds {
                offset: 0,
                count: 4,
                capacity: 2,
            },
        );
        assert_eq!(err.code, TRANSPORT_ERROR);
    }
}
