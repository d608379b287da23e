use epp_commands::{domain, Availability};
use serde::Serialize;

use crate::cmd::{finish, CheckArgs};
use crate::exit::{command_error, CliResult, SUCCESS};
use crate::output::{print_json, table, OutputFormat};

#[derive(Serialize)]
struct CheckOutput<'a> {
    results: &'a [Availability],
}

pub fn run(args: CheckArgs, format: OutputFormat) -> CliResult<i32> {
    let names: Vec<&str> = args.names.iter().map(String::as_str).collect();
    let mut session = args.login.login()?;
    let result = domain::check(&mut session, &names);
    finish(session);
    let results = result.map_err(|err| command_error("check failed", err))?;

    match format {
        OutputFormat::Json => print_json(&CheckOutput { results: &results }),
        OutputFormat::Table => {
            let mut out = table(["DOMAIN", "AVAILABLE", "REASON"]);
            for item in &results {
                out.add_row(vec![
                    item.id.clone(),
                    yes_no(item.available).to_string(),
                    item.reason.clone().unwrap_or_default(),
                ]);
            }
            println!("{out}");
        }
        OutputFormat::Pretty => {
            for item in &results {
                match &item.reason {
                    Some(reason) => println!("{}: {} ({reason})", item.id, yes_no(item.available)),
                    None => println!("{}: {}", item.id, yes_no(item.available)),
                }
            }
        }
    }
    Ok(SUCCESS)
}

fn yes_no(available: bool) -> &'static str {
    if available {
        "available"
    } else {
        "taken"
    }
}
