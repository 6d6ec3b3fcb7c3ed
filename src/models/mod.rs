//! All structured models of the device's `cli` output

mod config;
pub use config::*;

mod interface;
pub use interface::*;

mod system;
pub use system::*;

mod transceiver;
pub use transceiver::*;

mod vlan;
pub use vlan::*;

use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use serde_json::value::RawValue;

use crate::{extract_body, Error, Result};

/// The device returns a bare object for a single row and an array for
/// several, under the same key.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub(crate) fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }
}

/// Deserializes the `body` member of a `result` payload into `T`
pub(crate) fn decode_body<T: DeserializeOwned>(payload: &RawValue) -> Result<T> {
    let body = extract_body(payload)?;
    serde_json::from_str(body.get()).map_err(|e| {
        log::error!("models: unexpected body shape: {}", e);
        Error::parse(e.to_string(), payload.get())
    })
}

/// The device is inconsistent about quoting numbers, so we accept both
#[derive(Deserialize)]
#[serde(untagged)]
enum NumOrStr {
    Num(serde_json::Number),
    Str(String),
}

impl NumOrStr {
    fn into_u64<E: serde::de::Error>(self) -> std::result::Result<u64, E> {
        match self {
            NumOrStr::Num(n) => n
                .as_u64()
                .ok_or_else(|| E::custom(format!("expected an unsigned integer, got {}", n))),
            NumOrStr::Str(s) => s
                .trim()
                .parse()
                .map_err(|_| E::custom(format!("expected an unsigned integer, got `{}`", s))),
        }
    }

    fn into_string(self) -> String {
        match self {
            NumOrStr::Num(n) => n.to_string(),
            NumOrStr::Str(s) => s,
        }
    }
}

pub(crate) fn lenient_u64<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<u64, D::Error> {
    NumOrStr::deserialize(d)?.into_u64()
}

pub(crate) fn lenient_opt_u64<'de, D: Deserializer<'de>>(
    d: D,
) -> std::result::Result<Option<u64>, D::Error> {
    Option::<NumOrStr>::deserialize(d)?
        .map(NumOrStr::into_u64)
        .transpose()
}

pub(crate) fn lenient_opt_string<'de, D: Deserializer<'de>>(
    d: D,
) -> std::result::Result<Option<String>, D::Error> {
    Ok(Option::<NumOrStr>::deserialize(d)?.map(NumOrStr::into_string))
}
