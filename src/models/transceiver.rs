use std::fmt;

use serde::Deserialize;
use serde_json::value::RawValue;

use super::{decode_body, lenient_opt_string, lenient_opt_u64, OneOrMany};
use crate::Result;

/// An optical or copper module slot, from `show interface transceiver details`.
///
/// Empty slots are listed too, with `present` unset and no module details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transceiver {
    pub interface: String,
    pub present: bool,
    pub kind: String,
    pub vendor: String,
    pub part_number: String,
    pub revision: String,
    pub serial: String,
    /// Nominal bit rate, in MBit/s
    pub nominal_bitrate: u64,
}

#[derive(Deserialize)]
struct TransceiverBody {
    #[serde(rename = "TABLE_interface")]
    table: TransceiverTable,
}

#[derive(Deserialize)]
struct TransceiverTable {
    #[serde(rename = "ROW_interface")]
    rows: OneOrMany<TransceiverRow>,
}

#[derive(Deserialize)]
struct TransceiverRow {
    interface: String,
    sfp: String,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    partnum: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    rev: Option<String>,
    #[serde(default)]
    serialnum: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_u64")]
    nom_bitrate: Option<u64>,
}

impl From<TransceiverRow> for Transceiver {
    fn from(row: TransceiverRow) -> Self {
        let clean = |s: Option<String>| s.map(|s| s.trim().to_owned()).unwrap_or_default();
        Transceiver {
            present: row.sfp.trim() == "present",
            interface: row.interface,
            kind: clean(row.kind),
            vendor: clean(row.name),
            part_number: clean(row.partnum),
            revision: clean(row.rev),
            serial: clean(row.serialnum),
            nominal_bitrate: row.nom_bitrate.unwrap_or(0),
        }
    }
}

impl Transceiver {
    /// Parse the `result` payload of a `show interface transceiver details`
    /// command
    pub fn list_from_payload(payload: &RawValue) -> Result<Vec<Self>> {
        let body: TransceiverBody = decode_body(payload)?;
        Ok(body
            .table
            .rows
            .into_vec()
            .into_iter()
            .map(Transceiver::from)
            .collect())
    }
}

impl fmt::Display for Transceiver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Interface: {}, Present: {}, Type: {}, Vendor: {}, Part Number: {}, Revision: {}, Serial: {}, Bitrate: {}",
            self.interface,
            self.present,
            self.kind,
            self.vendor,
            self.part_number,
            self.revision,
            self.serial,
            self.nominal_bitrate
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transceivers() {
        let _ = env_logger::try_init();
        let payload = RawValue::from_string(
            r#"{"body": {"TABLE_interface": {"ROW_interface": [
                {"interface": "Ethernet1/1", "sfp": "present", "type": "10Gbase-SR",
                 "name": "CISCO-FINISAR   ", "partnum": "FTLX8571D3BCL-C2", "rev": "A",
                 "serialnum": "FNS17221ABC", "nom_bitrate": 10300, "len_50": 80},
                {"interface": "Ethernet1/2", "sfp": "not present"}
            ]}}}"#
                .into(),
        )
        .unwrap();
        let transceivers = Transceiver::list_from_payload(&payload).expect("failed to parse");
        assert_eq!(transceivers.len(), 2);
        assert_eq!(
            transceivers[0].to_string(),
            "Interface: Ethernet1/1, Present: true, Type: 10Gbase-SR, Vendor: CISCO-FINISAR, Part Number: FTLX8571D3BCL-C2, Revision: A, Serial: FNS17221ABC, Bitrate: 10300"
        );
        assert!(!transceivers[1].present);
        assert_eq!(
            transceivers[1].to_string(),
            "Interface: Ethernet1/2, Present: false, Type: , Vendor: , Part Number: , Revision: , Serial: , Bitrate: 0"
        );
    }
}
