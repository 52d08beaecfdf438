use crate::cmd::{open_session, parse_payload, QueryArgs};
use crate::exit::{session_error, CliResult, SUCCESS};
use crate::output::{print_frame, OutputFormat};

pub fn run(args: QueryArgs, format: OutputFormat) -> CliResult<i32> {
    let payload = parse_payload(&args.payload)?;
    let mut session = open_session(&args.port, &args.session)?;

    let reply = session
        .query(args.message_id, &payload, args.reply_id)
        .map_err(|err| session_error("query failed", err))?;
    print_frame(&reply, session.port_name(), format);

    Ok(SUCCESS)
}
