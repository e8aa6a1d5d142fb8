use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use framewire_frame::{FrameError, FramedChannel, MAX_FRAME};
use framewire_transport::{ByteTransport, MessageBuffer, UnixDomainSocket};

use crate::cmd::listen::install_ctrlc_handler;
use crate::cmd::{frame_config, EchoArgs};
use crate::exit::{frame_error, transport_error, CliResult, SUCCESS};

pub fn run(args: EchoArgs) -> CliResult<i32> {
    let listener =
        UnixDomainSocket::bind(&args.path).map_err(|err| transport_error("bind failed", err))?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    while running.load(Ordering::SeqCst) {
        let transport = listener
            .accept()
            .map_err(|err| transport_error("accept failed", err))?;
        let channel = FramedChannel::with_config(transport, frame_config(args.byte_order, None));

        match echo_until_closed(&channel, &running) {
            Ok(echoed) => tracing::info!(echoed, "peer disconnected"),
            Err(err) => return Err(frame_error("echo failed", err)),
        }
    }

    Ok(SUCCESS)
}

/// Send every received frame back unchanged. The header is re-encoded in
/// place, so the received buffer goes straight back out.
fn echo_until_closed<T: ByteTransport>(
    channel: &FramedChannel<T>,
    running: &AtomicBool,
) -> Result<usize, FrameError> {
    let mut buf = MessageBuffer::with_capacity(MAX_FRAME);
    let mut echoed = 0usize;

    while running.load(Ordering::SeqCst) {
        match channel.receive(&mut buf) {
            Ok(()) => {}
            Err(err) if err.is_closed() => break,
            Err(err) => return Err(err),
        }
        tracing::debug!(size = buf.used(), "echoing frame");
        channel.send(&mut buf)?;
        echoed += 1;
    }

    Ok(echoed)
}

#[cfg(test)]
mod tests {
    use framewire_transport::pipe;

    use super::*;

    #[test]
    fn echoes_frames_until_peer_closes() {
        let (client, server) = pipe();
        let client = FramedChannel::new(client);
        let server = FramedChannel::new(server);

        client.send_payload(b"first").unwrap();
        client.send_payload(b"").unwrap();
        client.send_payload(b"third").unwrap();
        client.transport().close();

        let running = AtomicBool::new(true);
        assert_eq!(echo_until_closed(&server, &running).unwrap(), 3);

        assert_eq!(client.receive_payload(64).unwrap().as_ref(), b"first");
        assert_eq!(client.receive_payload(64).unwrap().as_ref(), b"");
        assert_eq!(client.receive_payload(64).unwrap().as_ref(), b"third");
    }

    #[test]
    fn stopped_server_echoes_nothing() {
        let (_client, server) = pipe();
        let server = FramedChannel::new(server);

        let running = AtomicBool::new(false);
        assert_eq!(echo_until_closed(&server, &running).unwrap(), 0);
    }
}
