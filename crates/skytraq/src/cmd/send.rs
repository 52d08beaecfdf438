use tracing::info;

use crate::cmd::{drain_pending, open_session, parse_payload, SendArgs};
use crate::exit::{session_error, CliResult, SUCCESS};
use crate::output::{print_ack, OutputFormat};

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let payload = parse_payload(&args.payload)?;
    let mut session = open_session(&args.port, &args.session)?;

    if args.drain {
        let drained = drain_pending(&mut session, format)?;
        if drained > 0 {
            info!(frames = drained, "printed pending frames");
        }
    }

    let ack = session
        .send(args.message_id, &payload)
        .map_err(|err| session_error("send failed", err))?;
    print_ack(&ack, session.port_name(), format);

    Ok(SUCCESS)
}
