use framewire_transport::TransportError;

/// Errors that can occur while sending or receiving a frame.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The buffer cannot hold a frame header, or the transport delivered
    /// fewer bytes than a header.
    #[error("buffer too small ({available} bytes, need at least {required})")]
    BufferTooSmall { required: usize, available: usize },

    /// The received header declares a frame that does not fit the buffer.
    #[error("declared frame of {declared} bytes does not fit buffer capacity {capacity}")]
    FrameTooLarge { declared: usize, capacity: usize },

    /// The payload cannot be represented in the 16-bit length field.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The underlying transport failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl FrameError {
    /// Whether the peer closed the channel.
    pub fn is_closed(&self) -> bool {
        matches!(self, FrameError::Transport(TransportError::Closed))
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
