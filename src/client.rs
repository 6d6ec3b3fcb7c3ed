use url::Url;

use crate::{Connection, Endpoint, Result};

/// A client for one device's JSON-RPC API. You need to create a
/// [Connection] from this client, using [Client::connect], to make requests.
///
/// The underlying HTTP client is shared by every [Connection] made from
/// this client.
pub struct Client {
    endpoint: Endpoint,
    url: Url,
    http: reqwest::Client,
}

impl Client {
    /// Creates a new [Client] for `endpoint`.
    ///
    /// This doesn't contact the device. It can only fail if the HTTP client
    /// cannot be built, e.g. when the TLS backend fails to initialise.
    pub fn new(endpoint: Endpoint) -> Result<Self> {
        let url = endpoint.url()?;
        let http = reqwest::Client::builder()
            .user_agent(Self::user_agent())
            .danger_accept_invalid_certs(!endpoint.verify_tls())
            .connect_timeout(Endpoint::CONNECT_TIMEOUT)
            .timeout(endpoint.timeout())
            .build()?;
        log::debug!(
            "client: targeting {} (certificate verification {})",
            url,
            if endpoint.verify_tls() {
                "enabled"
            } else {
                "disabled"
            }
        );
        Ok(Client {
            endpoint,
            url,
            http,
        })
    }

    pub fn user_agent() -> &'static str {
        concat!("nxcli/", env!("CARGO_PKG_VERSION"))
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Open a new [Connection] to the device. No session is established,
    /// every request carries its own credentials, so this cannot fail.
    pub fn connect(&self) -> Connection {
        Connection::new(self.http.clone(), self.url.clone(), self.endpoint.clone())
    }
}
