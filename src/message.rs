//! JSON-RPC framing: the request objects we send and the envelopes we get
//! back from the device.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::{Error, Result, TransportError, TransportErrorKind};

/// Output format requested from the device for a command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Structured output, JSON-RPC method `cli`
    #[default]
    Json,
    /// Device-formatted text, JSON-RPC method `cli_ascii`
    Ascii,
}

impl Format {
    pub fn method(&self) -> &'static str {
        match self {
            Format::Json => "cli",
            Format::Ascii => "cli_ascii",
        }
    }
}

/// A single element of a JSON-RPC request batch
#[derive(Debug, Serialize)]
pub struct Request<'a> {
    jsonrpc: &'static str,
    method: &'static str,
    params: Params<'a>,
    pub id: u64,
}

#[derive(Debug, Serialize)]
struct Params<'a> {
    cmd: &'a str,
    version: u32,
}

impl<'a> Request<'a> {
    pub fn new(cmd: &'a str, format: Format, id: u64) -> Self {
        Request {
            jsonrpc: JSONRPC_VERSION,
            method: format.method(),
            params: Params {
                cmd,
                version: CLI_VERSION,
            },
            id,
        }
    }
}

/// Builds one [Request] per command, with ids counting up from `first_id`
pub fn build_batch<'a, S: AsRef<str>>(
    commands: &'a [S],
    format: Format,
    first_id: u64,
) -> Vec<Request<'a>> {
    commands
        .iter()
        .zip(first_id..)
        .map(|(cmd, id)| Request::new(cmd.as_ref(), format, id))
        .collect()
}

/// The `error` member of a JSON-RPC envelope
#[derive(Debug, Clone, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<Box<RawValue>>,
}

impl RpcError {
    /// The device puts its own explanation under `data.msg`
    pub fn detail(&self) -> Option<String> {
        #[derive(Deserialize)]
        struct Detail {
            msg: String,
        }
        let data = self.data.as_ref()?;
        serde_json::from_str::<Detail>(data.get())
            .ok()
            .map(|d| d.msg.trim().to_owned())
            .filter(|msg| !msg.is_empty())
    }
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(detail) = self.detail() {
            write!(f, ": {}", detail)?;
        }
        write!(f, " (code {})", self.code)
    }
}

/// A decoded JSON-RPC envelope: either the raw `result` payload, or the
/// `error` the device reported for that command.
#[derive(Debug)]
pub enum Envelope {
    /// `None` when the device sent a null or missing `result`, which it
    /// does for configuration commands
    Ok(Option<Box<RawValue>>),
    Err(RpcError),
}

impl Envelope {
    pub fn is_err(&self) -> bool {
        matches!(self, Envelope::Err(_))
    }
}

#[derive(Deserialize)]
struct RawEnvelope {
    #[serde(default)]
    id: Option<serde_json::Value>,
    #[serde(default)]
    result: Option<Box<RawValue>>,
    #[serde(default)]
    error: Option<RpcError>,
}

impl From<RawEnvelope> for Envelope {
    fn from(raw: RawEnvelope) -> Self {
        match raw.error {
            Some(err) => Envelope::Err(err),
            None => Envelope::Ok(raw.result),
        }
    }
}

/// Decodes the response body into envelopes, in the order they were sent.
///
/// The device answers a batch with an array, but may answer a single
/// command with a bare object. We probe the first significant byte to tell
/// them apart, since `result` has to stay raw and that rules out serde's
/// untagged enums.
pub fn decode_envelopes(body: &[u8]) -> Result<Vec<Envelope>> {
    let text = std::str::from_utf8(body).map_err(|_| {
        TransportError::new(TransportErrorKind::MalformedBody, "response is not utf8")
    })?;
    let trimmed = text.trim_start();
    let raws: Vec<RawEnvelope> = if trimmed.starts_with('[') {
        serde_json::from_str(trimmed).map_err(malformed)?
    } else if trimmed.starts_with('{') {
        vec![serde_json::from_str(trimmed).map_err(malformed)?]
    } else {
        log::error!("msg: response body is neither an array nor an object");
        return Err(
            TransportError::new(TransportErrorKind::MalformedBody, excerpt(trimmed)).into(),
        );
    };

    log::trace!("msg: decoded {} envelopes", raws.len());
    Ok(raws
        .into_iter()
        .map(|raw| {
            if let Some(ref id) = raw.id {
                log::trace!("msg: envelope id {}", id);
            }
            Envelope::from(raw)
        })
        .collect())
}

/// Extracts the `body` member the device nests command output under
pub fn extract_body(payload: &RawValue) -> Result<&RawValue> {
    #[derive(Deserialize)]
    struct WithBody<'a> {
        #[serde(borrow)]
        body: &'a RawValue,
    }
    serde_json::from_str::<WithBody>(payload.get())
        .map(|w| w.body)
        .map_err(|e| Error::parse(format!("no body in result: {}", e), payload.get()))
}

fn malformed(err: serde_json::Error) -> Error {
    TransportError::new(TransportErrorKind::MalformedBody, err.to_string()).into()
}

fn excerpt(s: &str) -> String {
    s.chars().take(80).collect()
}

const JSONRPC_VERSION: &str = "2.0";
const CLI_VERSION: u32 = 1;
