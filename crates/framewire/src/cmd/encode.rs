use bytes::BytesMut;
use framewire_frame::{encode_frame, HEADER_SIZE};

use crate::cmd::EncodeArgs;
use crate::exit::{frame_error, CliResult, SUCCESS};
use crate::output::{print_encoded, OutputFormat};

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let payload = args.payload.resolve()?;

    let mut frame = BytesMut::new();
    encode_frame(args.byte_order.into(), &payload, &mut frame)
        .map_err(|err| frame_error("encode failed", err))?;

    print_encoded(&frame, HEADER_SIZE, args.byte_order.name(), format);
    Ok(SUCCESS)
}
