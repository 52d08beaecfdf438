use skytraq_frame::Frame;

use crate::cmd::{parse_payload, EncodeArgs};
use crate::exit::{frame_error, CliResult, SUCCESS};
use crate::output::{print_wire, OutputFormat};

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let frame = Frame::new(args.message_id, parse_payload(&args.payload)?);
    let wire = frame
        .encode()
        .map_err(|err| frame_error("encode failed", err))?;
    print_wire(&frame, &wire, format);
    Ok(SUCCESS)
}
