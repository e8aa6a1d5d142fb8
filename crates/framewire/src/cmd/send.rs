use framewire_frame::{FramedChannel, MAX_FRAME};
use framewire_transport::UnixDomainSocket;

use crate::cmd::{frame_config, parse_duration, SendArgs};
use crate::exit::{frame_error, transport_error, CliResult, SUCCESS};
use crate::output::{print_frame, OutputFormat};

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let wait_timeout = parse_duration(&args.wait_timeout)?;
    let payload = args.payload.resolve()?;

    let transport = UnixDomainSocket::connect(&args.path)
        .map_err(|err| transport_error("connect failed", err))?;
    let config = frame_config(args.byte_order, args.wait.then_some(wait_timeout));
    let channel = FramedChannel::with_config_unix(transport, config)
        .map_err(|err| frame_error("connect failed", err))?;

    channel
        .send_payload(&payload)
        .map_err(|err| frame_error("send failed", err))?;
    tracing::debug!(size = payload.len(), path = %args.path.display(), "frame sent");

    if args.wait {
        let response = channel
            .receive_payload(MAX_FRAME)
            .map_err(|err| frame_error("receive failed", err))?;
        print_frame(0, &response, &args.path.display().to_string(), format);
    }

    Ok(SUCCESS)
}
