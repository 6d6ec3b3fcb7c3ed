//! Module that deals with the request/response exchange with the device.
//!
//! Refer to documentation of [Connection] for more details.

use bytes::Bytes;
use reqwest::{header, StatusCode};
use serde_json::value::RawValue;
use url::Url;

use crate::{
    build_batch, decode_envelopes, BgpSummary, ConfigurationText, Endpoint, Envelope, Error,
    Format, Interface, Result, SystemInfo, Transceiver, TransportError, Vlan, VlanCounter,
};

/// A channel to the device on which requests can be executed.
///
/// Each request is a single HTTP POST carrying one JSON-RPC batch, so
/// there is exactly one request in flight at a time. JSON-RPC ids keep
/// counting up across requests made on the same connection.
pub struct Connection {
    http: reqwest::Client,
    url: Url,
    endpoint: Endpoint,
    next_id: u64,
}

impl Connection {
    pub(crate) fn new(http: reqwest::Client, url: Url, endpoint: Endpoint) -> Self {
        Connection {
            http,
            url,
            endpoint,
            next_id: 1,
        }
    }

    /// Posts `commands` as one JSON-RPC batch and returns the raw response
    /// body.
    ///
    /// Errors with [crate::TransportErrorKind::HttpStatus] for responses with
    /// a status >= 400, except for a 500 carrying JSON-RPC error envelopes,
    /// which is how the device reports rejected commands.
    pub async fn execute<S: AsRef<str>>(
        &mut self,
        commands: &[S],
        format: Format,
    ) -> Result<Bytes> {
        if commands.is_empty() {
            return Err(Error::argument("at least one command is required"));
        }
        let batch = build_batch(commands, format, self.next_id);
        self.next_id += batch.len() as u64;
        let body = serde_json::to_vec(&batch)
            .map_err(|e| Error::argument(format!("failed to encode request: {}", e)))?;
        log::trace!("conn: request {}", String::from_utf8_lossy(&body));

        let response = self
            .http
            .post(self.url.clone())
            .basic_auth(self.endpoint.username(), Some(self.endpoint.password()))
            .header(header::CONTENT_TYPE, CONTENT_TYPE_JSON_RPC)
            .body(body)
            .send()
            .await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        log::debug!("conn: received {} with {} bytes", status, bytes.len());
        log::trace!("conn: response {}", String::from_utf8_lossy(&bytes));

        if status.as_u16() >= 400 {
            if status == StatusCode::INTERNAL_SERVER_ERROR && carries_rpc_errors(&bytes) {
                log::debug!("conn: treating {} as a device reply", status);
                return Ok(bytes);
            }
            return Err(TransportError::http_status(status.as_u16(), &bytes).into());
        }
        Ok(bytes)
    }

    /// Sends `commands` and returns one [Envelope] per command, in the order
    /// the commands were given.
    pub async fn send_request<S: AsRef<str>>(
        &mut self,
        commands: &[S],
        format: Format,
    ) -> Result<Vec<Envelope>> {
        let body = self.execute(commands, format).await?;
        let envelopes = decode_envelopes(&body)?;
        if envelopes.len() != commands.len() {
            log::error!(
                "conn: sent {} commands but received {} replies",
                commands.len(),
                envelopes.len()
            );
            return Err(Error::parse(
                format!(
                    "expected {} replies, received {}",
                    commands.len(),
                    envelopes.len()
                ),
                &String::from_utf8_lossy(&body),
            ));
        }
        Ok(envelopes)
    }

    /// Sends a single command and returns its `result` payload. Protocol
    /// errors and empty results are both errors here.
    pub async fn send_command(&mut self, command: &str, format: Format) -> Result<Box<RawValue>> {
        match self.send_single(command, format).await? {
            Envelope::Ok(Some(payload)) => Ok(payload),
            Envelope::Ok(None) => Err(Error::parse(
                format!("`{}` returned an empty result", command),
                "null",
            )),
            Envelope::Err(err) => Err(Error::ProtocolError(err)),
        }
    }

    /// Sends a single command, and returns its [Envelope] untouched
    pub async fn send_single(&mut self, command: &str, format: Format) -> Result<Envelope> {
        let mut envelopes = self.send_request(&[command], format).await?;
        // send_request guarantees one envelope per command
        envelopes
            .pop()
            .ok_or_else(|| Error::parse("no reply received", ""))
    }

    /// Sends a `show version` request and returns the parsed [SystemInfo]
    pub async fn show_version(&mut self) -> Result<SystemInfo> {
        let payload = self.send_command("show version", Format::Json).await?;
        SystemInfo::from_payload(&payload)
    }

    /// Sends a `show vlan` request and returns one entry per VLAN
    pub async fn show_vlans(&mut self) -> Result<Vec<Vlan>> {
        let payload = self.send_command("show vlan", Format::Json).await?;
        Vlan::list_from_payload(&payload)
    }

    /// Sends a `show vlan counters` request
    pub async fn show_vlan_counters(&mut self) -> Result<Vec<VlanCounter>> {
        let payload = self.send_command("show vlan counters", Format::Json).await?;
        VlanCounter::list_from_payload(&payload)
    }

    /// Sends a `show interface` request and returns one entry per interface
    pub async fn show_interfaces(&mut self) -> Result<Vec<Interface>> {
        let payload = self.send_command("show interface", Format::Json).await?;
        Interface::list_from_payload(&payload)
    }

    /// Sends a `show interface <name>` request for a single interface
    pub async fn show_interface(&mut self, name: &str) -> Result<Interface> {
        let command = format!("show interface {}", name);
        let payload = self.send_command(&command, Format::Json).await?;
        Interface::from_payload(&payload)
    }

    pub async fn show_running_config(&mut self) -> Result<ConfigurationText> {
        let payload = self
            .send_command("show running-config", Format::Ascii)
            .await?;
        ConfigurationText::from_payload(&payload)
    }

    pub async fn show_startup_config(&mut self) -> Result<ConfigurationText> {
        let payload = self
            .send_command("show startup-config", Format::Ascii)
            .await?;
        ConfigurationText::from_payload(&payload)
    }

    /// Sends `show running-config interface <name>`
    pub async fn show_running_config_interface(&mut self, name: &str) -> Result<ConfigurationText> {
        let command = format!("show running-config interface {}", name);
        let payload = self.send_command(&command, Format::Ascii).await?;
        ConfigurationText::from_payload(&payload)
    }

    pub async fn show_bgp_summary(&mut self) -> Result<BgpSummary> {
        let payload = self
            .send_command("show ip bgp summary", Format::Ascii)
            .await?;
        BgpSummary::from_payload(&payload)
    }

    /// Sends `show interface transceiver details`
    pub async fn show_transceivers(&mut self) -> Result<Vec<Transceiver>> {
        let payload = self
            .send_command("show interface transceiver details", Format::Json)
            .await?;
        Transceiver::list_from_payload(&payload)
    }

    /// Submits `commands` as a single configuration batch. The device runs
    /// them in order, so the first rejected command is the one we report.
    /// Commands before it have already been applied by then.
    pub async fn configure<S: AsRef<str>>(&mut self, commands: &[S]) -> Result<()> {
        let envelopes = self.send_request(commands, Format::Json).await?;
        for (idx, (envelope, command)) in envelopes.into_iter().zip(commands).enumerate() {
            if let Envelope::Err(error) = envelope {
                log::error!("conn: command #{} rejected: {}", idx + 1, error);
                return Err(Error::CommandError {
                    index: idx + 1,
                    command: command.as_ref().to_owned(),
                    error,
                });
            }
        }
        Ok(())
    }
}

/// Whether `body` decodes as envelopes with at least one error among them
fn carries_rpc_errors(body: &[u8]) -> bool {
    decode_envelopes(body)
        .map(|envelopes| envelopes.iter().any(Envelope::is_err))
        .unwrap_or(false)
}

const CONTENT_TYPE_JSON_RPC: &str = "application/json-rpc";
