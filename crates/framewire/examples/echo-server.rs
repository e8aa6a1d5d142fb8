//! Minimal echo server: accepts one connection and echoes frames back.
//!
//! Run with:
//!   cargo run --example echo-server
//!
//! In another terminal:
//!   cargo run --features cli -- send /tmp/framewire-echo-<pid>/echo.sock \
//!     --data hello --wait --wait-timeout 3s

use std::fs;

use framewire::frame::{FramedChannel, HEADER_SIZE, MAX_FRAME};
use framewire::transport::{MessageBuffer, UnixDomainSocket};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let sock_dir = std::env::temp_dir().join(format!("framewire-echo-{}", std::process::id()));
    fs::create_dir_all(&sock_dir)?;
    let sock_path = sock_dir.join("echo.sock");

    let listener = UnixDomainSocket::bind(&sock_path)?;
    eprintln!("Listening on {}", sock_path.display());

    let channel = FramedChannel::new(listener.accept()?);
    eprintln!("Peer connected");

    let mut buf = MessageBuffer::with_capacity(MAX_FRAME);
    loop {
        match channel.receive(&mut buf) {
            Ok(()) => {
                eprintln!("Received {} bytes", buf.payload(HEADER_SIZE).len());
                channel.send(&mut buf)?;
            }
            Err(e) => {
                eprintln!("Peer disconnected: {e}");
                break;
            }
        }
    }

    drop(listener);
    let _ = fs::remove_dir_all(&sock_dir);
    Ok(())
}
