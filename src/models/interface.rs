use std::fmt;

use serde::Deserialize;
use serde_json::value::RawValue;

use super::{decode_body, lenient_opt_string, lenient_opt_u64, OneOrMany};
use crate::{Error, Result};

/// A network interface, as seen by `show interface`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interface {
    pub name: String,
    /// Operational state
    pub state: String,
    pub admin_state: String,
    /// Burned-in hardware address. Empty for interfaces without one.
    pub bia_hw_addr: String,
    /// Empty when no address is configured
    pub ip_address: String,
    pub ip_mask_bits: u32,
    pub description: Option<String>,
    pub mtu: Option<u64>,
    pub speed: Option<String>,
}

#[derive(Deserialize)]
struct InterfaceBody {
    #[serde(rename = "TABLE_interface")]
    table: InterfaceTable,
}

#[derive(Deserialize)]
struct InterfaceTable {
    #[serde(rename = "ROW_interface")]
    rows: OneOrMany<InterfaceRow>,
}

/// Physical and port-channel interfaces use the `eth_` keys, while SVIs
/// report the same things under `svi_` keys
#[derive(Deserialize)]
struct InterfaceRow {
    interface: String,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    admin_state: Option<String>,
    #[serde(default)]
    svi_line_proto: Option<String>,
    #[serde(default)]
    svi_admin_state: Option<String>,
    #[serde(default)]
    eth_bia_addr: Option<String>,
    #[serde(default)]
    svi_mac: Option<String>,
    #[serde(default)]
    eth_ip_addr: Option<String>,
    #[serde(default)]
    svi_ip_addr: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_u64")]
    eth_ip_mask: Option<u64>,
    #[serde(default, deserialize_with = "lenient_opt_u64")]
    svi_ip_mask: Option<u64>,
    #[serde(default)]
    desc: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_u64")]
    eth_mtu: Option<u64>,
    #[serde(default, deserialize_with = "lenient_opt_u64")]
    svi_mtu: Option<u64>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    eth_speed: Option<String>,
}

impl InterfaceRow {
    fn into_interface(self, payload: &RawValue) -> Result<Interface> {
        let state = self.state.or(self.svi_line_proto).ok_or_else(|| {
            log::error!("ifc: no operational state for {}", self.interface);
            Error::parse(
                format!("interface `{}` has no state", self.interface),
                payload.get(),
            )
        })?;
        let admin_state = self.admin_state.or(self.svi_admin_state).ok_or_else(|| {
            log::error!("ifc: no admin state for {}", self.interface);
            Error::parse(
                format!("interface `{}` has no admin state", self.interface),
                payload.get(),
            )
        })?;
        let ip_address = self.eth_ip_addr.or(self.svi_ip_addr).unwrap_or_default();
        let mask = match self.eth_ip_mask.or(self.svi_ip_mask) {
            Some(mask) => mask,
            None if ip_address.is_empty() => 0,
            None => {
                log::error!("ifc: address {} on {} has no mask", ip_address, self.interface);
                return Err(Error::parse(
                    format!("interface `{}` has an address but no mask", self.interface),
                    payload.get(),
                ));
            }
        };
        let ip_mask_bits = u32::try_from(mask)
            .ok()
            .filter(|bits| *bits <= 128)
            .ok_or_else(|| {
                Error::parse(
                    format!("invalid mask {} on `{}`", mask, self.interface),
                    payload.get(),
                )
            })?;

        Ok(Interface {
            name: self.interface,
            state,
            admin_state,
            bia_hw_addr: self.eth_bia_addr.or(self.svi_mac).unwrap_or_default(),
            ip_address,
            ip_mask_bits,
            description: self.desc,
            mtu: self.eth_mtu.or(self.svi_mtu),
            speed: self.eth_speed,
        })
    }
}

impl Interface {
    /// Parse the `result` payload of a `show interface` command
    pub fn list_from_payload(payload: &RawValue) -> Result<Vec<Self>> {
        let body: InterfaceBody = decode_body(payload)?;
        body.table
            .rows
            .into_vec()
            .into_iter()
            .map(|row| row.into_interface(payload))
            .collect()
    }

    /// Parse the `result` payload of a `show interface <name>` command,
    /// which must describe exactly one interface
    pub fn from_payload(payload: &RawValue) -> Result<Self> {
        let mut interfaces = Self::list_from_payload(payload)?;
        if interfaces.len() != 1 {
            log::error!("ifc: expected one interface, found {}", interfaces.len());
            return Err(Error::parse(
                format!("expected one interface, found {}", interfaces.len()),
                payload.get(),
            ));
        }
        interfaces
            .pop()
            .ok_or_else(|| Error::parse("no interface found", payload.get()))
    }
}

impl fmt::Display for Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Interface Name: {}, State: {}/{}",
            self.name, self.state, self.admin_state
        )?;
        if !self.bia_hw_addr.is_empty() {
            write!(f, ", MAC: {}", self.bia_hw_addr)?;
        }
        if !self.ip_address.is_empty() {
            write!(f, ", IP: {}/{}", self.ip_address, self.ip_mask_bits)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(s: &str) -> Box<RawValue> {
        RawValue::from_string(s.to_owned()).unwrap()
    }

    fn interface(mac: &str, ip: &str) -> Interface {
        Interface {
            name: "Ethernet1/1".into(),
            state: "up".into(),
            admin_state: "up".into(),
            bia_hw_addr: mac.into(),
            ip_address: ip.into(),
            ip_mask_bits: 24,
            description: None,
            mtu: None,
            speed: None,
        }
    }

    #[test]
    fn test_render_optional_sections() {
        assert_eq!(
            interface("", "").to_string(),
            "Interface Name: Ethernet1/1, State: up/up"
        );
        assert_eq!(
            interface("00:11:22:33:44:55", "").to_string(),
            "Interface Name: Ethernet1/1, State: up/up, MAC: 00:11:22:33:44:55"
        );
        assert_eq!(
            interface("", "10.0.0.1").to_string(),
            "Interface Name: Ethernet1/1, State: up/up, IP: 10.0.0.1/24"
        );
        assert_eq!(
            interface("00:11:22:33:44:55", "10.0.0.1").to_string(),
            "Interface Name: Ethernet1/1, State: up/up, MAC: 00:11:22:33:44:55, IP: 10.0.0.1/24"
        );
    }

    #[test]
    fn test_single_interface() {
        let _ = env_logger::try_init();
        let payload = payload(
            r#"{"body": {"TABLE_interface": {"ROW_interface": {
                "interface": "Ethernet1/1", "state": "up", "admin_state": "up",
                "eth_bia_addr": "00:11:22:33:44:55", "eth_ip_addr": "10.0.0.1", "eth_ip_mask": 24,
                "desc": "uplink", "eth_mtu": "9216", "eth_speed": "10 Gb/s"
            }}}}"#,
        );
        let ifc = Interface::from_payload(&payload).expect("failed to parse");
        assert_eq!(ifc.name, "Ethernet1/1");
        assert_eq!(ifc.ip_mask_bits, 24);
        assert_eq!(ifc.mtu, Some(9216));
        assert_eq!(ifc.description.as_deref(), Some("uplink"));
        assert!(ifc
            .to_string()
            .ends_with("State: up/up, MAC: 00:11:22:33:44:55, IP: 10.0.0.1/24"));
    }

    #[test]
    fn test_interface_list_with_svi() {
        let _ = env_logger::try_init();
        let payload = payload(
            r#"{"body": {"TABLE_interface": {"ROW_interface": [
                {"interface": "mgmt0", "state": "up", "admin_state": "up", "eth_bia_addr": "5254.0011.2233"},
                {"interface": "Vlan10", "svi_line_proto": "down", "svi_admin_state": "down",
                 "svi_mac": "5254.0011.2234", "svi_ip_addr": "192.168.10.1", "svi_ip_mask": "24"},
                {"interface": "Ethernet1/2", "state": "down", "admin_state": "down"}
            ]}}}"#,
        );
        let interfaces = Interface::list_from_payload(&payload).expect("failed to parse");
        assert_eq!(interfaces.len(), 3);
        assert_eq!(
            interfaces[0].to_string(),
            "Interface Name: mgmt0, State: up/up, MAC: 5254.0011.2233"
        );
        assert_eq!(
            interfaces[1].to_string(),
            "Interface Name: Vlan10, State: down/down, MAC: 5254.0011.2234, IP: 192.168.10.1/24"
        );
        assert_eq!(
            interfaces[2].to_string(),
            "Interface Name: Ethernet1/2, State: down/down"
        );
    }

    #[test]
    fn test_single_projection_rejects_many() {
        let payload = payload(
            r#"{"body": {"TABLE_interface": {"ROW_interface": [
                {"interface": "a", "state": "up", "admin_state": "up"},
                {"interface": "b", "state": "up", "admin_state": "up"}
            ]}}}"#,
        );
        assert!(matches!(
            Interface::from_payload(&payload),
            Err(Error::ParseError { .. })
        ));
    }

    #[test]
    fn test_address_without_mask_is_an_error() {
        let payload = payload(
            r#"{"body": {"TABLE_interface": {"ROW_interface": {
                "interface": "Ethernet1/1", "state": "up", "admin_state": "up", "eth_ip_addr": "10.0.0.1"
            }}}}"#,
        );
        match Interface::from_payload(&payload) {
            Err(Error::ParseError { reason, .. }) => assert!(reason.contains("no mask")),
            other => panic!("expected a parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_state_is_an_error() {
        let payload = payload(
            r#"{"body": {"TABLE_interface": {"ROW_interface": {"interface": "Ethernet1/1"}}}}"#,
        );
        assert!(matches!(
            Interface::list_from_payload(&payload),
            Err(Error::ParseError { .. })
        ));
    }
}
