use std::fmt;

use serde_json::value::RawValue;

use super::decode_body;
use crate::Result;

/// Configuration text exactly as the device formats it, from
/// `show running-config`, `show startup-config` and
/// `show running-config interface <name>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationText {
    pub text: String,
}

impl ConfigurationText {
    pub fn from_payload(payload: &RawValue) -> Result<Self> {
        Ok(ConfigurationText {
            text: decode_body(payload)?,
        })
    }
}

impl fmt::Display for ConfigurationText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// The device's own rendering of `show ip bgp summary`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BgpSummary {
    pub text: String,
}

impl BgpSummary {
    pub fn from_payload(payload: &RawValue) -> Result<Self> {
        Ok(BgpSummary {
            text: decode_body(payload)?,
        })
    }
}

impl fmt::Display for BgpSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
