//! Validated description of the device API we talk to.

use std::{fmt, net::Ipv6Addr, str::FromStr, time::Duration};

use url::Url;

use crate::{Error, Result};

/// URL scheme used to reach the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Protocol {
    Http,
    #[default]
    Https,
}

impl FromStr for Protocol {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "http" => Ok(Protocol::Http),
            "https" => Ok(Protocol::Https),
            _ => Err(Error::argument(format!(
                "unsupported protocol `{}`, expected http or https",
                s
            ))),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Http => write!(f, "http"),
            Protocol::Https => write!(f, "https"),
        }
    }
}

/// Everything needed to reach and authenticate against one device.
///
/// Only [EndpointBuilder::build] creates these, so every instance has been
/// validated. Certificate verification is off unless explicitly enabled,
/// since management interfaces mostly ship with self-signed certificates.
#[derive(Clone)]
pub struct Endpoint {
    host: String,
    port: u16,
    protocol: Protocol,
    verify_tls: bool,
    username: String,
    password: String,
    timeout: Duration,
}

impl Endpoint {
    /// Deadline for a whole request/response exchange
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
    /// Deadline for establishing the TCP connection
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn builder() -> EndpointBuilder {
        EndpointBuilder::default()
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub fn verify_tls(&self) -> bool {
        self.verify_tls
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The API url, `<protocol>://<host>:<port>/ins`
    pub fn url(&self) -> Result<Url> {
        let host = if self.host.parse::<Ipv6Addr>().is_ok() {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        };
        let url = format!("{}://{}:{}{}", self.protocol, host, self.port, API_PATH);
        Url::parse(&url).map_err(|e| Error::argument(format!("invalid url {}: {}", url, e)))
    }
}

// hand written so the password never ends up in logs
impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("protocol", &self.protocol)
            .field("verify_tls", &self.verify_tls)
            .field("username", &self.username)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Collects and validates the fields of an [Endpoint]. Each setter rejects
/// bad input immediately, and [EndpointBuilder::build] rejects missing
/// mandatory fields.
#[derive(Clone)]
pub struct EndpointBuilder {
    host: Option<String>,
    port: u16,
    protocol: Protocol,
    verify_tls: bool,
    username: Option<String>,
    password: String,
    timeout: Duration,
}

impl Default for EndpointBuilder {
    fn default() -> Self {
        EndpointBuilder {
            host: None,
            port: DEFAULT_PORT,
            protocol: Protocol::default(),
            verify_tls: false,
            username: None,
            password: String::new(),
            timeout: Endpoint::DEFAULT_TIMEOUT,
        }
    }
}

impl EndpointBuilder {
    pub fn set_host(&mut self, host: &str) -> Result<&mut Self> {
        let host = host.trim();
        if host.is_empty() {
            return Err(Error::argument("host must not be empty"));
        }
        if host.parse::<Ipv6Addr>().is_err() {
            url::Host::parse(host)
                .map_err(|e| Error::argument(format!("invalid host `{}`: {}", host, e)))?;
        }
        self.host = Some(host.to_owned());
        Ok(self)
    }

    pub fn set_port(&mut self, port: u32) -> Result<&mut Self> {
        match u16::try_from(port) {
            Ok(p) if p > 0 => {
                self.port = p;
                Ok(self)
            }
            _ => Err(Error::argument(format!(
                "port {} out of range 1..65535",
                port
            ))),
        }
    }

    pub fn set_protocol(&mut self, protocol: &str) -> Result<&mut Self> {
        self.protocol = protocol.parse()?;
        Ok(self)
    }

    pub fn set_username(&mut self, username: &str) -> Result<&mut Self> {
        if username.is_empty() {
            return Err(Error::argument("username must not be empty"));
        }
        self.username = Some(username.to_owned());
        Ok(self)
    }

    /// Empty passwords are allowed
    pub fn set_password(&mut self, password: &str) -> Result<&mut Self> {
        self.password = password.to_owned();
        Ok(self)
    }

    /// Opt into TLS certificate and hostname verification
    pub fn set_verify_tls(&mut self, verify: bool) -> Result<&mut Self> {
        self.verify_tls = verify;
        Ok(self)
    }

    pub fn set_timeout(&mut self, timeout: Duration) -> Result<&mut Self> {
        if timeout.is_zero() {
            return Err(Error::argument("timeout must be positive"));
        }
        self.timeout = timeout;
        Ok(self)
    }

    pub fn build(&self) -> Result<Endpoint> {
        let host = self
            .host
            .clone()
            .ok_or_else(|| Error::argument("host is required"))?;
        let username = self
            .username
            .clone()
            .ok_or_else(|| Error::argument("username is required"))?;
        Ok(Endpoint {
            host,
            port: self.port,
            protocol: self.protocol,
            verify_tls: self.verify_tls,
            username,
            password: self.password.clone(),
            timeout: self.timeout,
        })
    }
}

/// Fixed path of the JSON-RPC API on this device family
const API_PATH: &str = "/ins";
const DEFAULT_PORT: u16 = 443;
