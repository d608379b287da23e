use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Subcommand};
use epp_session::{Session, SessionConfig};
use epp_transport::{load_certificates, ClientIdentity, RootStore, TlsConfig, DEFAULT_PORT};
use tracing::debug;

use crate::exit::{session_error, transport_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod check;
pub mod greeting;
pub mod info;
pub mod poll;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Connect and print the server greeting. Does not log in.
    Greeting(GreetingArgs),
    /// Check whether domain names are available.
    Check(CheckArgs),
    /// Show a registered domain.
    Info(InfoArgs),
    /// Read or acknowledge the next service message.
    Poll(PollArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Greeting(args) => greeting::run(args, format),
        Command::Check(args) => check::run(args, format),
        Command::Info(args) => info::run(args, format),
        Command::Poll(args) => poll::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Where the registry is and how to trust it.
#[derive(Args, Debug)]
pub struct ServerArgs {
    /// Registry host name.
    #[arg(long)]
    pub host: String,
    /// Registry port.
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,
    /// Additional trusted CA certificates (PEM).
    #[arg(long, value_name = "PATH")]
    pub ca_file: Option<PathBuf>,
    /// Trust only --ca-file, not the bundled web roots.
    #[arg(long, requires = "ca_file")]
    pub ca_only: bool,
    /// Client certificate chain (PEM) for registries that require one.
    #[arg(long, value_name = "PATH", requires = "key")]
    pub cert: Option<PathBuf>,
    /// Private key (PEM) for --cert.
    #[arg(long, value_name = "PATH", requires = "cert")]
    pub key: Option<PathBuf>,
    /// Dial and handshake timeout (e.g. 30s, 500ms).
    #[arg(long, default_value = "30s")]
    pub timeout: String,
}

/// Registrar credentials for commands that log in.
#[derive(Args, Debug)]
pub struct LoginArgs {
    #[command(flatten)]
    pub server: ServerArgs,
    /// Registrar account ID.
    #[arg(long, value_name = "ID")]
    pub client_id: String,
    /// File holding the account password on its first line.
    #[arg(long, value_name = "PATH")]
    pub password_file: PathBuf,
}

#[derive(Args, Debug)]
pub struct GreetingArgs {
    #[command(flatten)]
    pub server: ServerArgs,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub login: LoginArgs,
    /// Domain names to check.
    #[arg(required = true, value_name = "DOMAIN")]
    pub names: Vec<String>,
}

#[derive(Args, Debug)]
pub struct InfoArgs {
    #[command(flatten)]
    pub login: LoginArgs,
    /// Domain name to look up.
    #[arg(value_name = "DOMAIN")]
    pub name: String,
}

#[derive(Args, Debug)]
pub struct PollArgs {
    #[command(flatten)]
    pub login: LoginArgs,
    /// Acknowledge this message ID instead of reading the queue.
    #[arg(long, value_name = "ID")]
    pub ack: Option<String>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

impl ServerArgs {
    fn tls_config(&self) -> CliResult<TlsConfig> {
        let roots = match &self.ca_file {
            None => RootStore::WebPki,
            Some(path) => {
                let anchors = load_certificates(path)
                    .map_err(|err| transport_error("invalid --ca-file", err))?;
                if self.ca_only {
                    RootStore::Custom(anchors)
                } else {
                    RootStore::WebPkiAnd(anchors)
                }
            }
        };
        let client_identity = match (&self.cert, &self.key) {
            (Some(cert), Some(key)) => Some(
                ClientIdentity::from_pem_files(cert, key)
                    .map_err(|err| transport_error("invalid client certificate", err))?,
            ),
            _ => None,
        };
        Ok(TlsConfig {
            roots,
            client_identity,
        })
    }

    fn session_config(&self, client_id: &str, password: String) -> CliResult<SessionConfig> {
        Ok(SessionConfig::new(&self.host, client_id, password)
            .with_port(self.port)
            .with_timeout(parse_timeout(&self.timeout)?)
            .with_tls(self.tls_config()?))
    }

    /// Dial and read the greeting.
    pub fn connect(&self) -> CliResult<Session> {
        open(self.session_config("", String::new())?)
    }
}

impl LoginArgs {
    /// Dial, read the greeting and log in.
    pub fn login(&self) -> CliResult<Session> {
        let password = read_password(&self.password_file)?;
        let mut session = open(self.server.session_config(&self.client_id, password)?)?;
        session
            .login()
            .map_err(|err| session_error("login failed", err))?;
        Ok(session)
    }
}

fn open(config: SessionConfig) -> CliResult<Session> {
    let mut session = Session::new(config).map_err(|err| session_error("TLS setup failed", err))?;
    session
        .connect()
        .map_err(|err| session_error("connect failed", err))?;
    Ok(session)
}

/// Log out, or just close if the session never logged in. Failures are
/// only logged since the command itself already succeeded.
pub fn finish(mut session: Session) {
    if session.state() == epp_session::SessionState::Authenticated {
        if let Err(err) = session.logout() {
            debug!(error = %err, "logout failed");
        }
    }
    session.close();
}

fn read_password(path: &Path) -> CliResult<String> {
    let contents = std::fs::read_to_string(path).map_err(|err| {
        CliError::new(
            USAGE,
            format!("failed to read password file {}: {err}", path.display()),
        )
    })?;
    let password = contents.lines().next().unwrap_or_default().trim_end().to_string();
    if password.is_empty() {
        return Err(CliError::new(
            USAGE,
            format!("password file {} is empty", path.display()),
        ));
    }
    Ok(password)
}

pub fn parse_timeout(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "timeout must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid timeout value: {input}")))?;
    if value == 0 {
        return Err(CliError::new(USAGE, "timeout must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}
