use std::path::PathBuf;

/// Errors that can occur in byte transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// An I/O error occurred on the underlying stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The peer closed the channel before the requested bytes were transferred.
    #[error("transport closed")]
    Closed,

    /// The requested byte range does not fit the message buffer.
    #[error("byte range {offset}..{offset}+{count} exceeds buffer capacity {capacity}")]
    OutOfBounds {
        offset: usize,
        count: usize,
        capacity: usize,
    },

    /// The message buffer has no storage and this transport does not allocate.
    #[error("message buffer has no storage")]
    Unallocated,

    /// Failed to bind to the specified address.
    #[error("failed to bind to {path}: {source}")]
    Bind {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to connect to the specified address.
    #[error("failed to connect to {path}: {source}")]
    Connect {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to accept an incoming connection.
    #[error("failed to accept connection: {0}")]
    Accept(std::io::Error),

    /// The socket path is too long for the platform.
    #[error("socket path too long ({len} bytes, max {max}): {path}")]
    PathTooLong {
        path: PathBuf,
        len: usize,
        max: usize,
    },
}

pub type Result<T> = std::result::Result<T, TransportError>;
