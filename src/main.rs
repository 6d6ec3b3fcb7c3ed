//! nxcli: run a command against a switch's JSON-RPC management API and
//! print the result.

use std::{ffi::OsString, io::Write, process::ExitCode};

use clap::{ArgAction, Parser, ValueEnum};

use nxcli::{dispatch, Client, Command, Endpoint, Result};

#[derive(Parser, Debug)]
#[command(
    name = "nxcli",
    version,
    about = "Run a command against a switch's JSON-RPC management API",
    long_about = None
)]
struct Cli {
    /// Device hostname or IP address
    #[arg(long)]
    host: String,

    /// TCP port of the API
    #[arg(long, default_value_t = 443)]
    port: u32,

    /// URL scheme, http or https
    #[arg(long, default_value = "https")]
    proto: String,

    /// Verify the device's TLS certificate and hostname. Disabled by
    /// default: any certificate the device presents is accepted.
    #[arg(
        long,
        action = ArgAction::Set,
        num_args = 0..=1,
        default_value_t = false,
        default_missing_value = "true"
    )]
    secure: bool,

    /// Username for HTTP basic authentication
    #[arg(long)]
    user: String,

    /// Password for HTTP basic authentication. Use -pass=<value> when the
    /// password starts with a dash.
    #[arg(long, default_value = "")]
    pass: String,

    /// Command to run, e.g. "show version" or
    /// "interface Ethernet1/1 ; description uplink ; no shutdown"
    #[arg(long)]
    cli: String,

    /// Diagnostic verbosity, logged to stderr
    #[arg(long = "log.level", value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Long flags that may also be spelled with a single dash, e.g. `-host`
const SINGLE_DASH_FLAGS: &[&str] = &[
    "host",
    "port",
    "proto",
    "secure",
    "user",
    "pass",
    "cli",
    "log.level",
    "version",
    "help",
];

/// Rewrites `-flag` and `-flag=value` into their `--` form, for the flags
/// we know about. Everything after a bare `--` is left alone.
fn normalize_args<I: IntoIterator<Item = OsString>>(args: I) -> Vec<OsString> {
    let mut passthrough = false;
    args.into_iter()
        .enumerate()
        .map(|(idx, arg)| {
            if idx == 0 || passthrough {
                return arg;
            }
            if arg == "--" {
                passthrough = true;
                return arg;
            }
            arg.to_str().and_then(double_dash).unwrap_or(arg)
        })
        .collect()
}

fn double_dash(arg: &str) -> Option<OsString> {
    let rest = arg.strip_prefix('-').filter(|rest| !rest.starts_with('-'))?;
    let name = rest.split('=').next().unwrap_or(rest);
    SINGLE_DASH_FLAGS
        .contains(&name)
        .then(|| OsString::from(format!("-{}", arg)))
}

fn endpoint(cli: &Cli) -> Result<Endpoint> {
    let mut builder = Endpoint::builder();
    builder
        .set_host(&cli.host)?
        .set_port(cli.port)?
        .set_protocol(&cli.proto)?
        .set_verify_tls(cli.secure)?
        .set_username(&cli.user)?
        .set_password(&cli.pass)?;
    builder.build()
}

async fn run(cli: Cli) -> Result<()> {
    // everything is validated before we touch the network
    let command: Command = cli.cli.parse()?;
    let endpoint = endpoint(&cli)?;

    let client = Client::new(endpoint)?;
    let mut connection = client.connect();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    dispatch(&mut connection, &command, &mut out).await?;
    out.flush()?;
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse_from(normalize_args(std::env::args_os()));
    env_logger::Builder::new()
        .filter_level(cli.log_level.into())
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("nxcli: {}", err);
            ExitCode::FAILURE
        }
    }
}
