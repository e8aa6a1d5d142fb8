use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use framewire_frame::FramedChannel;
use framewire_transport::{MessageBuffer, UnixDomainSocket};

use crate::cmd::{frame_config, ListenArgs};
use crate::exit::{frame_error, transport_error, CliError, CliResult, SUCCESS};
use crate::output::{print_frame, OutputFormat};

pub fn run(args: ListenArgs, format: OutputFormat) -> CliResult<i32> {
    let listener =
        UnixDomainSocket::bind(&args.path).map_err(|err| transport_error("bind failed", err))?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut buf = MessageBuffer::with_capacity(args.capacity);
    let mut printed = 0usize;
    let mut connections = 0usize;

    while running.load(Ordering::SeqCst) {
        let transport = listener
            .accept()
            .map_err(|err| transport_error("accept failed", err))?;
        let channel = FramedChannel::with_config(transport, frame_config(args.byte_order, None));
        let peer = format!("conn-{connections}");
        connections = connections.saturating_add(1);
        tracing::info!(%peer, "peer connected");

        while running.load(Ordering::SeqCst) {
            match channel.receive(&mut buf) {
                Ok(()) => {}
                Err(err) if err.is_closed() => {
                    tracing::info!(%peer, "peer disconnected");
                    break;
                }
                Err(err) => return Err(frame_error("receive failed", err)),
            }

            print_frame(
                printed,
                buf.payload(channel.reserve_header_size()),
                &peer,
                format,
            );
            printed = printed.saturating_add(1);

            if let Some(count) = args.count {
                if printed >= count.get() {
                    return Ok(SUCCESS);
                }
            }
        }
    }

    Ok(SUCCESS)
}

pub(crate) fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}
