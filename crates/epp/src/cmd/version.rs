use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("epp {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: epp");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!("target: {}", env!("EPP_BUILD_TARGET"));
    println!("target_env: {}", env!("EPP_BUILD_TARGET_ENV"));
    println!("profile: {}", env!("EPP_BUILD_PROFILE"));
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("tls: rustls (ring)");
    println!(
        "protocol: EPP {} (RFC 5730-5734)",
        epp_session::SessionConfig::default().version
    );

    Ok(SUCCESS)
}
