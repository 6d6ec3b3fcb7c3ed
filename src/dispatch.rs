//! Maps a user supplied command string onto the request we make and the
//! way we render its result.

use std::{fmt::Display, io::Write, str::FromStr};

use serde_json::value::RawValue;

use crate::{extract_body, Connection, Envelope, Error, Format, Result};

/// A command, as recognized from the user's input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    ShowVersion,
    ShowVlans,
    ShowVlanCounters,
    ShowInterfaces,
    ShowInterface(String),
    ShowRunningConfig,
    ShowStartupConfig,
    ShowRunningConfigInterface(String),
    ShowBgpSummary,
    ShowTransceivers,
    /// The individual device commands of an `interface ...` batch
    ConfigureInterface(Vec<String>),
    /// Anything else, sent as is
    Generic(String),
}

impl FromStr for Command {
    type Err = Error;

    /// Matching is done on whitespace-normalized input: exact commands
    /// first, then the parameterized `show` forms (whose parameter must be
    /// a single word), then the `interface` configuration prefix.
    fn from_str(input: &str) -> Result<Self> {
        let normalized = input.split_whitespace().collect::<Vec<_>>().join(" ");
        if normalized.is_empty() {
            return Err(Error::argument("command must not be empty"));
        }

        let exact = match normalized.as_str() {
            "show version" => Some(Command::ShowVersion),
            "show vlan" => Some(Command::ShowVlans),
            "show vlan counters" => Some(Command::ShowVlanCounters),
            "show interface" => Some(Command::ShowInterfaces),
            "show running-config" => Some(Command::ShowRunningConfig),
            "show startup-config" => Some(Command::ShowStartupConfig),
            "show ip bgp summary" => Some(Command::ShowBgpSummary),
            "show interface transceiver details" => Some(Command::ShowTransceivers),
            _ => None,
        };
        if let Some(command) = exact {
            return Ok(command);
        }

        // longest prefix first
        if let Some(name) = single_word_after(&normalized, "show running-config interface ") {
            return Ok(Command::ShowRunningConfigInterface(name.to_owned()));
        }
        if let Some(name) = single_word_after(&normalized, "show interface ") {
            return Ok(Command::ShowInterface(name.to_owned()));
        }

        if normalized.split(' ').next() == Some("interface") {
            let commands: Vec<String> = input
                .split(';')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_owned)
                .collect();
            return Ok(Command::ConfigureInterface(commands));
        }

        Ok(Command::Generic(input.trim().to_owned()))
    }
}

fn single_word_after<'a>(input: &'a str, prefix: &str) -> Option<&'a str> {
    input
        .strip_prefix(prefix)
        .filter(|rest| !rest.is_empty() && !rest.contains(' '))
}

/// Runs `command` on `connection`, writing its rendering to `out`
pub async fn dispatch<W: Write>(
    connection: &mut Connection,
    command: &Command,
    out: &mut W,
) -> Result<()> {
    log::debug!("dispatch: running {:?}", command);
    match command {
        Command::ShowVersion => render_one(out, connection.show_version().await?),
        Command::ShowVlans => render_all(out, connection.show_vlans().await?),
        Command::ShowVlanCounters => render_all(out, connection.show_vlan_counters().await?),
        Command::ShowInterfaces => render_all(out, connection.show_interfaces().await?),
        Command::ShowInterface(name) => render_one(out, connection.show_interface(name).await?),
        Command::ShowRunningConfig => render_one(out, connection.show_running_config().await?),
        Command::ShowStartupConfig => render_one(out, connection.show_startup_config().await?),
        Command::ShowRunningConfigInterface(name) => render_one(
            out,
            connection.show_running_config_interface(name).await?,
        ),
        Command::ShowBgpSummary => render_one(out, connection.show_bgp_summary().await?),
        Command::ShowTransceivers => render_all(out, connection.show_transceivers().await?),
        Command::ConfigureInterface(commands) => {
            connection.configure(commands.as_slice()).await?;
            log::info!("dispatch: applied {} commands", commands.len());
            Ok(())
        }
        Command::Generic(cmd) => generic(connection, cmd, out).await,
    }
}

/// Sends `command` as is, and prints the `body` the device nested the
/// output under. When the result has no `body`, the raw result is printed
/// before the decode error is returned.
async fn generic<W: Write>(connection: &mut Connection, command: &str, out: &mut W) -> Result<()> {
    let payload = match connection.send_single(command, Format::Json).await? {
        Envelope::Err(err) => return Err(Error::ProtocolError(err)),
        Envelope::Ok(None) => {
            log::debug!("dispatch: `{}` returned no output", command);
            return Ok(());
        }
        Envelope::Ok(Some(payload)) => payload,
    };
    match extract_body(&payload) {
        Ok(body) => write_body(out, body),
        Err(err) => {
            writeln!(out, "{}", payload.get())?;
            Err(err)
        }
    }
}

/// Text bodies print decoded, structured ones as the JSON we received
fn write_body<W: Write>(out: &mut W, body: &RawValue) -> Result<()> {
    match serde_json::from_str::<String>(body.get()) {
        Ok(text) => writeln!(out, "{}", text)?,
        Err(_) => writeln!(out, "{}", body.get())?,
    }
    Ok(())
}

fn render_one<W: Write, T: Display>(out: &mut W, item: T) -> Result<()> {
    writeln!(out, "{}", item)?;
    Ok(())
}

fn render_all<W: Write, T: Display>(out: &mut W, items: Vec<T>) -> Result<()> {
    for item in &items {
        writeln!(out, "{}", item)?;
    }
    Ok(())
}
