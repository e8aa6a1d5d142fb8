//! Length-prefixed message framing over stream-oriented byte transports.
//!
//! framewire lets a caller exchange discrete messages over a channel that only
//! offers "read N bytes" and "write N bytes": a serial line, a ring buffer, a
//! socket. Each message travels as `[u16 length][payload]`.
//!
//! # Crate Structure
//!
//! - [`transport`] — Byte transports and the message buffer they fill
//! - [`frame`] — The length-prefix codec and the framed channel

/// Re-export transport types.
pub mod transport {
    pub use framewire_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use framewire_frame::*;
}
