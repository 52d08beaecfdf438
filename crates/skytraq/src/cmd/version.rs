use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("skytraq {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: skytraq");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "target: {}",
        option_env!("SKYTRAQ_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!(
        "defaults: baud={}, max_ack_attempts={}, max_sync_attempts={}",
        skytraq_transport::DEFAULT_BAUD_RATE,
        skytraq_session::DEFAULT_MAX_ACK_ATTEMPTS,
        skytraq_frame::DEFAULT_MAX_SYNC_ATTEMPTS
    );

    Ok(SUCCESS)
}
