use std::fmt;

use crate::RpcError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// Simple wrapper over all I/O related errors, e.g. writing output
    IoError(std::io::Error),
    /// An invalid or missing argument, detected before any network activity
    ArgumentError(String),
    /// The HTTP exchange with the device failed
    TransportError(TransportError),
    /// The JSON-RPC envelope carried a non-null `error` member
    ProtocolError(RpcError),
    /// We were unable to semantically parse the payload. `payload` holds
    /// the raw bytes we received, so callers can still inspect them.
    ParseError { reason: String, payload: String },
    /// A command inside a configuration batch was rejected by the device.
    /// `index` is 1-based, in submission order.
    CommandError {
        index: usize,
        command: String,
        error: RpcError,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::IoError(err) => write!(f, "IO operation failed: {}", err),
            Error::ArgumentError(msg) => write!(f, "invalid argument: {}", msg),
            Error::TransportError(err) => write!(f, "transport error: {}", err),
            Error::ProtocolError(err) => write!(f, "device returned an error: {}", err),
            Error::ParseError { reason, .. } => {
                write!(f, "failed to parse device response: {}", reason)
            }
            Error::CommandError {
                index,
                command,
                error,
            } => write!(f, "command #{} `{}` failed: {}", index, command, error),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::IoError(err) => Some(err),
            Self::TransportError(err) => Some(err),
            _ => None,
        }
    }
}

impl Error {
    pub(crate) fn parse<R: Into<String>>(reason: R, payload: &str) -> Self {
        Self::ParseError {
            reason: reason.into(),
            payload: payload.to_owned(),
        }
    }

    pub(crate) fn argument<M: Into<String>>(msg: M) -> Self {
        Self::ArgumentError(msg.into())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}

impl From<TransportError> for Error {
    fn from(err: TransportError) -> Self {
        Error::TransportError(err)
    }
}

impl From<RpcError> for Error {
    fn from(err: RpcError) -> Self {
        Error::ProtocolError(err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::TransportError(TransportError::from(err))
    }
}

/// Classification of failed HTTP exchanges
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportErrorKind {
    Dns,
    Connect,
    Tls,
    Timeout,
    /// The device answered with a status >= 400. `excerpt` holds the start
    /// of the response body.
    HttpStatus { status: u16, excerpt: String },
    MalformedBody,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportErrorKind::Dns => write!(f, "dns"),
            TransportErrorKind::Connect => write!(f, "connect"),
            TransportErrorKind::Tls => write!(f, "tls"),
            TransportErrorKind::Timeout => write!(f, "timeout"),
            TransportErrorKind::HttpStatus { status, .. } => write!(f, "http status {}", status),
            TransportErrorKind::MalformedBody => write!(f, "malformed body"),
        }
    }
}

#[derive(Debug)]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new<M: Into<String>>(kind: TransportErrorKind, message: M) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Builds an [TransportErrorKind::HttpStatus] error, keeping at most
    /// [EXCERPT_LEN] characters of `body`
    pub fn http_status(status: u16, body: &[u8]) -> Self {
        let excerpt: String = String::from_utf8_lossy(body)
            .chars()
            .take(EXCERPT_LEN)
            .collect();
        Self {
            message: excerpt.clone(),
            kind: TransportErrorKind::HttpStatus { status, excerpt },
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.kind, self.message)
        }
    }
}

impl std::error::Error for TransportError {}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let kind = classify(&err);
        let mut message = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(inner) = source {
            message.push_str(": ");
            message.push_str(&inner.to_string());
            source = inner.source();
        }
        Self { kind, message }
    }
}

/// Maps a reqwest error onto our error kinds. reqwest doesn't expose dns
/// or tls failures directly, so we look at the source chain for them.
fn classify(err: &reqwest::Error) -> TransportErrorKind {
    if err.is_timeout() {
        return TransportErrorKind::Timeout;
    }
    if let Some(status) = err.status() {
        return TransportErrorKind::HttpStatus {
            status: status.as_u16(),
            excerpt: String::new(),
        };
    }
    if err.is_decode() || err.is_body() {
        return TransportErrorKind::MalformedBody;
    }

    let mut chain = String::new();
    let mut source = std::error::Error::source(err);
    while let Some(inner) = source {
        chain.push_str(&inner.to_string().to_ascii_lowercase());
        chain.push('\n');
        source = inner.source();
    }
    if chain.contains("dns") || chain.contains("lookup") || chain.contains("resolve") {
        TransportErrorKind::Dns
    } else if chain.contains("certificate")
        || chain.contains("tls")
        || chain.contains("handshake")
    {
        TransportErrorKind::Tls
    } else {
        TransportErrorKind::Connect
    }
}

/// Number of body characters kept in an http status error
const EXCERPT_LEN: usize = 256;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_excerpt_is_bounded() {
        let body = "x".repeat(1000);
        let err = TransportError::http_status(401, body.as_bytes());
        match err.kind {
            TransportErrorKind::HttpStatus { status, ref excerpt } => {
                assert_eq!(status, 401);
                assert_eq!(excerpt.len(), EXCERPT_LEN);
            }
            ref kind => panic!("unexpected kind {:?}", kind),
        }
    }

    #[test]
    fn test_command_error_display() {
        let err = Error::CommandError {
            index: 2,
            command: "description x".into(),
            error: RpcError {
                code: -32602,
                message: "invalid".into(),
                data: None,
            },
        };
        let text = err.to_string();
        assert!(text.contains("#2"));
        assert!(text.contains("description x"));
        assert!(text.contains("invalid"));
    }
}
