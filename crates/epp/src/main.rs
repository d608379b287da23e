mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "epp", version, about = "EPP registry client")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "warn", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    match cmd::run(cli.command, format) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_check_subcommand() {
        let cli = Cli::try_parse_from([
            "epp",
            "--format",
            "json",
            "check",
            "--host",
            "epp.example.net",
            "--client-id",
            "REG-1",
            "--password-file",
            "/tmp/pw",
            "example.at",
            "other.at",
        ])
        .expect("check args should parse");

        let Command::Check(args) = cli.command else {
            panic!("expected check");
        };
        assert_eq!(args.names, vec!["example.at", "other.at"]);
        assert_eq!(args.login.server.port, 700);
        assert_eq!(args.login.server.timeout, "30s");
        assert!(matches!(cli.format, Some(OutputFormat::Json)));
    }

    #[test]
    fn check_requires_names() {
        let err = Cli::try_parse_from([
            "epp",
            "check",
            "--host",
            "epp.example.net",
            "--client-id",
            "REG-1",
            "--password-file",
            "/tmp/pw",
        ])
        .expect_err("missing names should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn greeting_needs_no_credentials() {
        let cli = Cli::try_parse_from(["epp", "greeting", "--host", "epp.example.net", "--port", "7000"])
            .expect("greeting args should parse");
        let Command::Greeting(args) = cli.command else {
            panic!("expected greeting");
        };
        assert_eq!(args.server.port, 7000);
    }

    #[test]
    fn client_cert_requires_key() {
        let err = Cli::try_parse_from([
            "epp",
            "greeting",
            "--host",
            "epp.example.net",
            "--cert",
            "/tmp/cert.pem",
        ])
        .expect_err("cert without key should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn poll_ack_parses() {
        let cli = Cli::try_parse_from([
            "epp",
            "poll",
            "--host",
            "epp.example.net",
            "--client-id",
            "REG-1",
            "--password-file",
            "/tmp/pw",
            "--ack",
            "12345",
        ])
        .expect("poll args should parse");
        let Command::Poll(args) = cli.command else {
            panic!("expected poll");
        };
        assert_eq!(args.ack.as_deref(), Some("12345"));
    }
}
