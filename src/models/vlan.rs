use std::fmt;

use serde::Deserialize;
use serde_json::value::RawValue;

use super::{decode_body, lenient_opt_string, lenient_opt_u64, lenient_u64, OneOrMany};
use crate::{Error, Result};

/// A VLAN, as listed by `show vlan`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vlan {
    pub id: String,
    pub name: String,
    pub state: Option<String>,
    pub ports: Vec<String>,
}

// newer releases nest the rows under the `vlanbriefxbrief` keys
#[derive(Deserialize)]
struct VlanBody {
    #[serde(rename = "TABLE_vlanbrief", alias = "TABLE_vlanbriefxbrief")]
    table: VlanTable,
}

#[derive(Deserialize)]
struct VlanTable {
    #[serde(rename = "ROW_vlanbrief", alias = "ROW_vlanbriefxbrief")]
    rows: OneOrMany<VlanRow>,
}

// the device sends the id both as a number and as a string, under different
// keys, so they can't be serde aliases of each other
#[derive(Deserialize)]
struct VlanRow {
    #[serde(
        rename = "vlanshowbr-vlanid-utf",
        default,
        deserialize_with = "lenient_opt_string"
    )]
    id_utf: Option<String>,
    #[serde(
        rename = "vlanshowbr-vlanid",
        default,
        deserialize_with = "lenient_opt_string"
    )]
    id: Option<String>,
    #[serde(rename = "vlanshowbr-vlanname")]
    name: String,
    #[serde(rename = "vlanshowbr-vlanstate", default)]
    state: Option<String>,
    #[serde(rename = "vlanshowplist-ifidx", default)]
    ports: Option<OneOrMany<String>>,
}

impl Vlan {
    /// Parse the `result` payload of a `show vlan` command
    pub fn list_from_payload(payload: &RawValue) -> Result<Vec<Self>> {
        let body: VlanBody = decode_body(payload)?;
        body.table
            .rows
            .into_vec()
            .into_iter()
            .map(|row| {
                let id = row.id_utf.or(row.id).ok_or_else(|| {
                    log::error!("vlan: row {} without an id", row.name);
                    Error::parse(format!("vlan `{}` has no id", row.name), payload.get())
                })?;
                let ports = row
                    .ports
                    .map(OneOrMany::into_vec)
                    .unwrap_or_default()
                    .iter()
                    .flat_map(|p| p.split(','))
                    .map(|p| p.trim().to_owned())
                    .filter(|p| !p.is_empty())
                    .collect();
                Ok(Vlan {
                    id,
                    name: row.name,
                    state: row.state,
                    ports,
                })
            })
            .collect()
    }
}

impl fmt::Display for Vlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vlan ID {}, Name: {}", self.id, self.name)
    }
}

/// Per VLAN traffic counters, from `show vlan counters`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VlanCounter {
    pub id: u32,
    pub input_unicast_bytes: u64,
    pub output_unicast_bytes: u64,
    pub input_multicast_bytes: Option<u64>,
    pub output_multicast_bytes: Option<u64>,
    pub input_broadcast_bytes: Option<u64>,
    pub output_broadcast_bytes: Option<u64>,
}

#[derive(Deserialize)]
struct CounterBody {
    #[serde(rename = "TABLE_vlancounters")]
    table: CounterTable,
}

#[derive(Deserialize)]
struct CounterTable {
    #[serde(rename = "ROW_vlancounters")]
    rows: OneOrMany<CounterRow>,
}

#[derive(Deserialize)]
struct CounterRow {
    #[serde(rename = "vlanshowbr-vlanid", deserialize_with = "lenient_u64")]
    id: u64,
    #[serde(deserialize_with = "lenient_u64")]
    l2_ing_ucast_b: u64,
    #[serde(deserialize_with = "lenient_u64")]
    l2_egr_ucast_b: u64,
    #[serde(default, deserialize_with = "lenient_opt_u64")]
    l2_ing_mcast_b: Option<u64>,
    #[serde(default, deserialize_with = "lenient_opt_u64")]
    l2_egr_mcast_b: Option<u64>,
    #[serde(default, deserialize_with = "lenient_opt_u64")]
    l2_ing_bcast_b: Option<u64>,
    #[serde(default, deserialize_with = "lenient_opt_u64")]
    l2_egr_bcast_b: Option<u64>,
}

impl VlanCounter {
    /// Parse the `result` payload of a `show vlan counters` command
    pub fn list_from_payload(payload: &RawValue) -> Result<Vec<Self>> {
        let body: CounterBody = decode_body(payload)?;
        body.table
            .rows
            .into_vec()
            .into_iter()
            .map(|row| {
                let id = u32::try_from(row.id).map_err(|_| {
                    Error::parse(format!("vlan id {} out of range", row.id), payload.get())
                })?;
                Ok(VlanCounter {
                    id,
                    input_unicast_bytes: row.l2_ing_ucast_b,
                    output_unicast_bytes: row.l2_egr_ucast_b,
                    input_multicast_bytes: row.l2_ing_mcast_b,
                    output_multicast_bytes: row.l2_egr_mcast_b,
                    input_broadcast_bytes: row.l2_ing_bcast_b,
                    output_broadcast_bytes: row.l2_egr_bcast_b,
                })
            })
            .collect()
    }
}

impl fmt::Display for VlanCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Vlan ID {}, InUcastBytes: {}, OutUcastBytes: {}",
            self.id, self.input_unicast_bytes, self.output_unicast_bytes
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(s: &str) -> Box<RawValue> {
        RawValue::from_string(s.to_owned()).unwrap()
    }

    #[test]
    fn test_vlan_list() {
        let _ = env_logger::try_init();
        let payload = payload(
            r#"{"body": {"TABLE_vlanbriefxbrief": {"ROW_vlanbriefxbrief": [
                {"vlanshowbr-vlanid": 1, "vlanshowbr-vlanid-utf": "1", "vlanshowbr-vlanname": "default",
                 "vlanshowbr-vlanstate": "active", "vlanshowplist-ifidx": "Ethernet1/1-4,Ethernet1/7"},
                {"vlanshowbr-vlanid": 10, "vlanshowbr-vlanname": "users", "vlanshowbr-vlanstate": "active"}
            ]}, "TABLE_mtuinfo": {"ROW_mtuinfo": [
                {"vlanshowinfo-vlanid": 1, "vlanshowinfo-media-type": "enet", "vlanshowinfo-vlanmode": "ce-vlan"}
            ]}}}"#,
        );
        let vlans = Vlan::list_from_payload(&payload).expect("failed to parse");
        assert_eq!(vlans.len(), 2);
        assert_eq!(vlans[0].to_string(), "Vlan ID 1, Name: default");
        assert_eq!(vlans[0].ports, vec!["Ethernet1/1-4", "Ethernet1/7"]);
        assert_eq!(vlans[1].id, "10");
        assert_eq!(vlans[1].to_string(), "Vlan ID 10, Name: users");
        assert!(vlans[1].ports.is_empty());
    }

    #[test]
    fn test_single_vlan_brief_keys() {
        let payload = payload(
            r#"{"body": {"TABLE_vlanbrief": {"ROW_vlanbrief":
                {"vlanshowbr-vlanid-utf": "1", "vlanshowbr-vlanname": "default"}}}}"#,
        );
        let vlans = Vlan::list_from_payload(&payload).expect("failed to parse");
        assert_eq!(vlans.len(), 1);
        assert_eq!(vlans[0].id, "1");
    }

    #[test]
    fn test_vlan_without_id() {
        let payload = payload(
            r#"{"body": {"TABLE_vlanbrief": {"ROW_vlanbrief": {"vlanshowbr-vlanname": "x"}}}}"#,
        );
        assert!(matches!(
            Vlan::list_from_payload(&payload),
            Err(Error::ParseError { .. })
        ));
    }

    #[test]
    fn test_vlan_counters() {
        let _ = env_logger::try_init();
        let payload = payload(
            r#"{"body": {"TABLE_vlancounters": {"ROW_vlancounters": [
                {"vlanshowbr-vlanid": 1, "l2_ing_ucast_b": 1024, "l2_egr_ucast_b": "2048", "l2_ing_mcast_b": 5},
                {"vlanshowbr-vlanid": "10", "l2_ing_ucast_b": 0, "l2_egr_ucast_b": 0}
            ]}}}"#,
        );
        let counters = VlanCounter::list_from_payload(&payload).expect("failed to parse");
        assert_eq!(counters.len(), 2);
        assert_eq!(
            counters[0].to_string(),
            "Vlan ID 1, InUcastBytes: 1024, OutUcastBytes: 2048"
        );
        assert_eq!(counters[0].input_multicast_bytes, Some(5));
        assert_eq!(counters[1].id, 10);
        assert!(counters[1].output_broadcast_bytes.is_none());
    }
}
