//! Library for talking to the JSON-RPC management API (`/ins`) of NX-OS
//! style switches.
//!
//! ## Examples
//! ```no_run
//! use nxcli::*;
//!
//! async fn show_interfaces() -> Result<()> {
//!     let mut builder = Endpoint::builder();
//!     builder
//!         .set_host("nx-01.example.net")?
//!         .set_username("admin")?
//!         .set_password("secret")?;
//!     let client = Client::new(builder.build()?)?;
//!     let mut connection = client.connect();
//!
//!     // we can either use the raw protocol
//!     let envelopes = connection
//!         .send_request(&["show interface"], Format::Json)
//!         .await?;
//!     for envelope in &envelopes {
//!         println!("received envelope: {:?}", envelope);
//!     }
//!
//!     // or a structured exchange
//!     match connection.show_interfaces().await {
//!         Ok(interfaces) => {
//!             for ifc in &interfaces {
//!                 println!("{}", ifc);
//!             }
//!         }
//!         Err(Error::ParseError { reason, payload }) => {
//!             // the raw payload is still available even though
//!             // semantic parsing failed
//!             println!("unexpected shape ({}): {}", reason, payload);
//!         }
//!         Err(e) => return Err(e),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Compatibility
//! This library has been tested only against the NX-API `cli` and
//! `cli_ascii` JSON-RPC methods.

mod client;
pub use client::*;

mod connection;
pub use connection::*;

mod dispatch;
pub use dispatch::*;

mod endpoint;
pub use endpoint::*;

mod error;
pub use error::*;

mod message;
pub use message::*;

mod models;
pub use models::*;
