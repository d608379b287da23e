use epp_commands::Greeting;

use crate::cmd::{finish, GreetingArgs};
use crate::exit::{command_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{join, print_json, print_record, OutputFormat};

pub fn run(args: GreetingArgs, format: OutputFormat) -> CliResult<i32> {
    let session = args.server.connect()?;
    let raw = session
        .greeting()
        .ok_or_else(|| CliError::new(DATA_INVALID, "server sent no greeting"))?;
    let greeting = Greeting::parse(raw).map_err(|err| command_error("invalid greeting", err))?;
    finish(session);

    match format {
        OutputFormat::Json => print_json(&greeting),
        _ => print_record(
            "Greeting",
            &[
                ("Server", greeting.server_id.clone()),
                ("Date", greeting.server_date.clone()),
                ("Versions", join(&greeting.versions)),
                ("Languages", join(&greeting.languages)),
                ("Objects", join(&greeting.object_uris)),
                ("Extensions", join(&greeting.extension_uris)),
                (
                    "Access",
                    greeting
                        .access
                        .map(|a| format!("{a:?}"))
                        .unwrap_or_default(),
                ),
            ],
            format,
        ),
    }
    Ok(SUCCESS)
}
