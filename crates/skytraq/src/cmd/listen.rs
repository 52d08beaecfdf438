use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use skytraq_session::SessionError;
use tracing::warn;

use crate::cmd::{open_session, ListenArgs};
use crate::exit::{session_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_frame, OutputFormat};

pub fn run(args: ListenArgs, format: OutputFormat) -> CliResult<i32> {
    let mut session = open_session(&args.port, &args.session)?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut printed = 0usize;

    while running.load(Ordering::SeqCst) {
        let frame = match session.recv() {
            Ok(frame) => frame,
            Err(err) if keep_listening(&err) => {
                warn!(error = %err, "skipping unreadable frame");
                continue;
            }
            Err(err) => return Err(session_error("receive failed", err)),
        };

        if let Some(ids) = &args.ids {
            if !ids.contains(&frame.message_id) {
                continue;
            }
        }

        print_frame(&frame, session.port_name(), format);
        printed = printed.saturating_add(1);

        if let Some(count) = args.count {
            if printed >= count {
                return Ok(SUCCESS);
            }
        }
    }

    Ok(SUCCESS)
}

/// A quiet line or a corrupted frame is not a reason to stop.
fn keep_listening(err: &SessionError) -> bool {
    match err {
        SessionError::Frame(err) => !err.is_channel_error() || err.is_timeout(),
        _ => false,
    }
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
