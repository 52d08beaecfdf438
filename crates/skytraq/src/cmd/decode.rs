use skytraq_frame::decode_frame;

use crate::cmd::{parse_payload, DecodeArgs};
use crate::exit::{frame_error, CliResult, SUCCESS};
use crate::output::{print_frame, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let bytes = parse_payload(&args.hex)?;
    let frame = decode_frame(&bytes, args.max_sync_attempts)
        .map_err(|err| frame_error("decode failed", err))?;
    print_frame(&frame, "-", format);
    Ok(SUCCESS)
}
