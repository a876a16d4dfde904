//! Serde model of one entry in the registry's `nodes` array.
//!
//! Keys are the literal keys of the upstream document. Optional keys that
//! may be present with a `null` value deserialize to `None`, so "present but
//! null" and "absent" are the same thing everywhere in this crate. Unknown
//! keys are kept in the `extra` maps so a record serializes back to the
//! document it came from.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Branch reported when an autoupdater block carries no `branch` key.
///
/// Downstream consumers match on this literal text, so the missing branch
/// is spelled out as a string instead of being modelled as an absent value.
pub const AUTOUPDATER_BRANCH_FALLBACK: &str = "None";

/// Peer name to connection state. `None` means the peer is disconnected.
pub type PeerTable = IndexMap<String, Option<Value>>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRecord {
    pub flags: Flags,
    pub lastseen: Value,
    pub nodeinfo: NodeInfo,
    pub statistics: Statistics,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flags {
    pub online: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeInfo {
    pub hostname: String,
    pub network: Network,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hardware: Option<Hardware>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<Owner>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<System>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub software: Option<Software>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Network {
    pub mac: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addresses: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mesh_interfaces: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mesh: Option<IndexMap<String, MeshDefinition>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshDefinition {
    pub interfaces: IndexMap<String, Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Hardware {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Owner {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct System {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_code: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Software {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fastd: Option<Fastd>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firmware: Option<Firmware>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autoupdater: Option<Autoupdater>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fastd {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Fastd {
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(false)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Firmware {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    pub release: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Autoupdater {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Autoupdater {
    /// Configured branch, or [`AUTOUPDATER_BRANCH_FALLBACK`] when unset.
    pub fn branch(&self) -> &str {
        self.branch.as_deref().unwrap_or(AUTOUPDATER_BRANCH_FALLBACK)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Statistics {
    /// Seconds since boot. Upstream sends fractional values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uptime: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway6: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mesh_vpn: Option<MeshVpn>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeshVpn {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<MeshVpnGroups>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peers: Option<PeerTable>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeshVpnGroups {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backbone: Option<PeerGroup>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PeerGroup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peers: Option<PeerTable>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MeshVpn {
    /// Names of connected peers: backbone group first, then top-level
    /// peers, each in document order.
    pub fn connected_peers(&self) -> impl Iterator<Item = &str> + '_ {
        let backbone = self
            .groups
            .as_ref()
            .and_then(|groups| groups.backbone.as_ref())
            .and_then(|backbone| backbone.peers.as_ref());

        backbone
            .into_iter()
            .chain(self.peers.as_ref())
            .flat_map(|table| table.iter())
            .filter(|(_, conn)| conn.is_some())
            .map(|(name, _)| name.as_str())
    }
}

impl Network {
    /// `(interface, mac)` for every secondary MAC of every mesh, in
    /// document order.
    pub fn mesh_macs(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.mesh
            .iter()
            .flat_map(|meshes| meshes.values())
            .flat_map(|mesh| mesh.interfaces.iter())
            .flat_map(|(iface, macs)| macs.iter().map(move |mac| (iface.as_str(), mac.as_str())))
    }
}

impl NodeInfo {
    pub fn firmware(&self) -> Option<&Firmware> {
        self.software.as_ref()?.firmware.as_ref()
    }

    pub fn autoupdater(&self) -> Option<&Autoupdater> {
        self.software.as_ref()?.autoupdater.as_ref()
    }

    pub fn model(&self) -> Option<&str> {
        self.hardware.as_ref()?.model.as_deref()
    }

    pub fn contact(&self) -> Option<&str> {
        self.owner.as_ref()?.contact.as_deref()
    }

    pub fn site_code(&self) -> Option<&str> {
        self.system.as_ref()?.site_code.as_deref()
    }
}

impl NodeRecord {
    /// `lastseen` as text: strings verbatim, anything else as JSON.
    pub fn lastseen_text(&self) -> String {
        match &self.lastseen {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> NodeRecord {
        serde_json::from_value(value).expect("record")
    }

    fn minimal() -> Value {
        json!({
            "flags": {"online": true},
            "lastseen": "2024-01-01T00:00:00+0000",
            "nodeinfo": {"hostname": "node", "network": {"mac": "aa:bb:cc:dd:ee:ff"}},
            "statistics": {}
        })
    }

    #[test]
    fn null_mesh_and_owner_read_as_absent() {
        let mut value = minimal();
        value["nodeinfo"]["network"]["mesh"] = Value::Null;
        value["nodeinfo"]["network"]["mesh_interfaces"] = Value::Null;
        value["nodeinfo"]["owner"] = Value::Null;
        let node = record(value);
        assert!(node.nodeinfo.network.mesh.is_none());
        assert!(node.nodeinfo.network.mesh_interfaces.is_none());
        assert!(node.nodeinfo.contact().is_none());
        assert_eq!(node.nodeinfo.network.mesh_macs().count(), 0);
    }

    #[test]
    fn autoupdater_branch_falls_back_to_literal_none() {
        let updater: Autoupdater = serde_json::from_value(json!({"enabled": true})).unwrap();
        assert_eq!(updater.branch(), "None");
        assert!(updater.is_enabled());

        let updater: Autoupdater = serde_json::from_value(json!({})).unwrap();
        assert!(!updater.is_enabled());
    }

    #[test]
    fn connected_peers_keep_document_order_and_skip_null() {
        let vpn: MeshVpn = serde_json::from_value(json!({
            "groups": {"backbone": {"peers": {
                "sn05": null,
                "sn02": {"established": 12.5},
                "sn01": {"established": 3.0}
            }}},
            "peers": {"gw09": {"established": 1.0}, "gw03": null}
        }))
        .unwrap();
        let names: Vec<_> = vpn.connected_peers().collect();
        assert_eq!(names, ["sn02", "sn01", "gw09"]);
    }

    #[test]
    fn mesh_macs_follow_document_order() {
        let mut value = minimal();
        value["nodeinfo"]["network"]["mesh"] = json!({
            "bat0": {"interfaces": {
                "wireless": ["02:00:00:00:00:02", "02:00:00:00:00:01"],
                "tunnel": ["02:00:00:00:00:03"]
            }}
        });
        let node = record(value);
        let macs: Vec<_> = node.nodeinfo.network.mesh_macs().collect();
        assert_eq!(
            macs,
            [
                ("wireless", "02:00:00:00:00:02"),
                ("wireless", "02:00:00:00:00:01"),
                ("tunnel", "02:00:00:00:00:03"),
            ]
        );
    }

    #[test]
    fn unknown_keys_survive_serialization() {
        let mut value = minimal();
        value["nodeinfo"]["location"] = json!({"latitude": 52.3, "longitude": 9.7});
        value["nodeinfo"]["network"]["addresses"] = json!(["fe80::1"]);
        let node = record(value.clone());
        assert_eq!(serde_json::to_value(&node).unwrap(), value);
    }

    #[test]
    fn lastseen_text_passes_strings_through() {
        let node = record(minimal());
        assert_eq!(node.lastseen_text(), "2024-01-01T00:00:00+0000");

        let mut value = minimal();
        value["lastseen"] = json!(1_700_000_000);
        assert_eq!(record(value).lastseen_text(), "1700000000");
    }
}
