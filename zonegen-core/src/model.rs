//! Data model for the records fetched from the directory service.
//!
//! Field names mirror the JSON feed, including the `domaine_ip_*` range
//! endpoints, so the structs deserialize straight from the REST responses.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// IPv4 assignment attached to a host record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ipv4Assignment {
    pub ipv4: String,
    #[serde(default)]
    pub ip_type: String,
}

/// One IPv6 address attached to a host record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ipv6Assignment {
    pub ipv6: String,
}

/// One fetched host entry: name, extension, MAC and addresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostRecord {
    pub domain: String,
    pub extension: String,
    #[serde(default)]
    pub mac_address: String,
    pub ipv4: Ipv4Assignment,
    #[serde(default)]
    pub ipv6: Vec<Ipv6Assignment>,
}

/// A DNS domain suffix with its host classification tag and declared IPv4
/// range. `domaine_ip_start <= domaine_ip_stop` under numeric ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extension {
    pub extension: String,
    #[serde(rename = "type")]
    pub ip_type: String,
    pub domaine_ip_start: String,
    pub domaine_ip_stop: String,
}

/// SOA contact and parameter block for one zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoaMeta {
    pub mail: String,
    /// Pre-formatted refresh/retry/expire/minimum lines, emitted verbatim.
    pub param: String,
}

/// Per-extension zone metadata; one-to-one with [`Extension`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneMeta {
    pub name: String,
    pub soa: SoaMeta,
    /// The zone's own literal entry line (typically the apex A record).
    pub zone_entry: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NsRecord {
    pub zone: String,
    pub ns_entry: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MxRecord {
    pub zone: String,
    pub mx_entry: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxtRecord {
    pub zone: String,
    pub txt_entry: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SrvRecord {
    pub extension: String,
    pub srv_entry: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasRecord {
    pub extension: String,
    pub cname_entry: String,
}

/// Everything the zone renderers need for one regeneration run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneData {
    pub hosts: Vec<HostRecord>,
    pub extensions: Vec<Extension>,
    pub zones: Vec<ZoneMeta>,
    pub ns: Vec<NsRecord>,
    pub mx: Vec<MxRecord>,
    pub txt: Vec<TxtRecord>,
    pub srv: Vec<SrvRecord>,
    pub aliases: Vec<AliasRecord>,
}

impl ZoneData {
    /// Distinct extension names, in a stable order.
    pub fn extension_names(&self) -> BTreeSet<String> {
        self.extensions
            .iter()
            .map(|e| e.extension.clone())
            .collect()
    }

    /// Zone metadata for one extension, if the feed carried it.
    pub fn zone_meta(&self, extension: &str) -> Option<&ZoneMeta> {
        self.zones.iter().find(|z| z.name == extension)
    }
}

#[cfg(test)]
mod tests {
    use super::ZoneData;

    #[test]
    fn host_records_deserialize_from_feed_shape() {
        let raw = r#"[{
            "domain": "srv",
            "extension": ".test",
            "mac_address": "AA:BB:CC:DD:EE:FF",
            "ipv4": {"ipv4": "10.69.0.1", "ip_type": "srv"},
            "ipv6": [{"ipv6": "2001:db8::1"}]
        }]"#;
        let hosts: Vec<super::HostRecord> = serde_json::from_str(raw).expect("parse hosts");
        assert_eq!(hosts[0].domain, "srv");
        assert_eq!(hosts[0].ipv4.ip_type, "srv");
        assert_eq!(hosts[0].ipv6.len(), 1);
    }

    #[test]
    fn missing_ipv6_defaults_to_empty() {
        let raw = r#"[{
            "domain": "srv",
            "extension": ".test",
            "mac_address": "AA:BB:CC:DD:EE:FF",
            "ipv4": {"ipv4": "10.69.0.1", "ip_type": "srv"}
        }]"#;
        let hosts: Vec<super::HostRecord> = serde_json::from_str(raw).expect("parse hosts");
        assert!(hosts[0].ipv6.is_empty());
    }

    #[test]
    fn extension_type_field_maps_to_ip_type() {
        let raw = r#"[{
            "extension": ".test",
            "type": "srv",
            "domaine_ip_start": "10.69.0.1",
            "domaine_ip_stop": "10.69.0.254"
        }]"#;
        let extensions: Vec<super::Extension> = serde_json::from_str(raw).expect("parse");
        assert_eq!(extensions[0].ip_type, "srv");
    }

    #[test]
    fn extension_names_are_deduplicated() {
        let raw = r#"[
            {"extension": ".test", "type": "a", "domaine_ip_start": "10.0.0.1", "domaine_ip_stop": "10.0.0.2"},
            {"extension": ".test", "type": "b", "domaine_ip_start": "10.0.1.1", "domaine_ip_stop": "10.0.1.2"}
        ]"#;
        let data = ZoneData {
            extensions: serde_json::from_str(raw).expect("parse"),
            ..ZoneData::default()
        };
        assert_eq!(data.extension_names().len(), 1);
    }
}
