use epp_commands::{poll, PollMessage};

use crate::cmd::{finish, PollArgs};
use crate::exit::{command_error, CliResult, SUCCESS};
use crate::output::{print_json, print_record, OutputFormat};

pub fn run(args: PollArgs, format: OutputFormat) -> CliResult<i32> {
    let mut session = args.login.login()?;
    let result = match &args.ack {
        Some(id) => poll::ack(&mut session, id),
        None => poll::request(&mut session),
    };
    finish(session);
    let message = result.map_err(|err| command_error("poll failed", err))?;

    match format {
        OutputFormat::Json => print_json(&message),
        _ if message.is_empty_queue() && args.ack.is_none() => println!("No messages."),
        _ => print_record("Message", &fields(&message), format),
    }
    Ok(SUCCESS)
}

fn fields(message: &PollMessage) -> Vec<(&'static str, String)> {
    let queue = message.queue.clone().unwrap_or_default();
    vec![
        ("Result", format!("{} {}", message.outcome.code, message.outcome.message)),
        ("ID", queue.id),
        ("Queued", if message.queue.is_some() { queue.count.to_string() } else { String::new() }),
        ("Date", queue.q_date.unwrap_or_default()),
        ("Message", queue.msg.unwrap_or_default()),
        ("Data", message.res_data.clone().unwrap_or_default()),
    ]
}
