use epp_commands::domain::{self, DomainInfo};

use crate::cmd::{finish, InfoArgs};
use crate::exit::{command_error, CliResult, SUCCESS};
use crate::output::{join, print_json, print_record, OutputFormat};

pub fn run(args: InfoArgs, format: OutputFormat) -> CliResult<i32> {
    let mut session = args.login.login()?;
    let result = domain::info(&mut session, &args.name);
    finish(session);
    let info = result.map_err(|err| command_error("info failed", err))?;

    match format {
        OutputFormat::Json => print_json(&info),
        _ => print_record("Domain", &fields(&info), format),
    }
    Ok(SUCCESS)
}

fn fields(info: &DomainInfo) -> Vec<(&'static str, String)> {
    let statuses: Vec<String> = info.statuses.iter().map(|s| s.value.clone()).collect();
    let contacts: Vec<String> = info
        .contacts
        .iter()
        .map(|c| format!("{}={}", c.role, c.id))
        .collect();
    // The auth code is a transfer secret and stays out of human output.
    vec![
        ("Name", info.name.clone()),
        ("ROID", info.roid.clone()),
        ("Status", join(&statuses)),
        ("Registrant", info.registrant.clone().unwrap_or_default()),
        ("Contacts", join(&contacts)),
        ("Nameservers", join(&info.nameservers)),
        ("Sponsor", info.client_id.clone()),
        ("Created", info.created.clone().unwrap_or_default()),
        ("Updated", info.updated.clone().unwrap_or_default()),
        ("Expires", info.expires.clone().unwrap_or_default()),
    ]
}
