use std::hash::{Hash, Hasher};
use std::net::IpAddr;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{RegistryError, Result};
use crate::model::NodeRecord;

/// What to do with a node that fails to decode or normalize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MalformedPolicy {
    /// Fail the whole load with the first error.
    #[default]
    Abort,
    /// Log the error, drop the node and keep going.
    Skip,
}

/// A node record with its `network.addresses` parsed.
///
/// Equality and hashing use `network.mac` only, compared without `:` and
/// `-` separators.
#[derive(Debug, Clone)]
pub struct Node {
    record: NodeRecord,
    addresses: Option<Vec<IpAddr>>,
}

impl Node {
    /// Parse every entry of `network.addresses`, keeping order. The record
    /// itself is left untouched.
    pub fn prepare(record: NodeRecord) -> Result<Self> {
        let addresses = match &record.nodeinfo.network.addresses {
            None => None,
            Some(raw) => Some(
                raw.iter()
                    .enumerate()
                    .map(|(idx, text)| {
                        text.parse::<IpAddr>()
                            .map_err(|_| RegistryError::InvalidAddress {
                                node: record.nodeinfo.network.mac.clone(),
                                path: format!("nodeinfo.network.addresses[{idx}]"),
                                address: text.clone(),
                            })
                    })
                    .collect::<Result<Vec<_>>>()?,
            ),
        };

        Ok(Self { record, addresses })
    }

    pub fn record(&self) -> &NodeRecord {
        &self.record
    }

    pub fn mac(&self) -> &str {
        &self.record.nodeinfo.network.mac
    }

    pub fn hostname(&self) -> &str {
        &self.record.nodeinfo.hostname
    }

    /// Parsed addresses, or `None` when the record carries no `addresses` key.
    pub fn addresses(&self) -> Option<&[IpAddr]> {
        self.addresses.as_deref()
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        mac_digits(self.mac()).eq(mac_digits(other.mac()))
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for c in mac_digits(self.mac()) {
            c.hash(state);
        }
    }
}

/// Characters of a MAC without `:` and `-` separators. Case is preserved.
pub fn mac_digits(mac: &str) -> impl Iterator<Item = char> + '_ {
    mac.chars().filter(|c| !matches!(c, ':' | '-'))
}

/// Drop `:` and `-` separators. Case is preserved.
pub fn strip_separators(mac: &str) -> String {
    mac_digits(mac).collect()
}

/// `fe80::/16` by textual prefix, which is how operators read it.
pub fn is_link_local(addr: &IpAddr) -> bool {
    match addr {
        IpAddr::V6(v6) => v6.segments()[0] == 0xfe80,
        IpAddr::V4(_) => false,
    }
}

#[derive(Debug, Default)]
pub struct Registry {
    pub nodes: Vec<Node>,
    /// Errors of nodes dropped under [`MalformedPolicy::Skip`].
    pub skipped: Vec<RegistryError>,
}

impl Registry {
    /// Decode a registry document (`{"nodes": [...], ...}`).
    pub fn from_slice(bytes: &[u8], policy: MalformedPolicy) -> Result<Self> {
        #[derive(Deserialize)]
        struct Document {
            nodes: Vec<Value>,
        }

        let document: Document = serde_json::from_slice(bytes)?;
        let mut registry = Registry::default();
        for (idx, value) in document.nodes.into_iter().enumerate() {
            match decode_node(idx, value) {
                Ok(node) => registry.nodes.push(node),
                Err(err) if policy == MalformedPolicy::Skip => {
                    log::warn!("Skipping node: {err}");
                    registry.skipped.push(err);
                }
                Err(err) => return Err(err),
            }
        }

        log::debug!(
            "Decoded {} nodes ({} skipped)",
            registry.nodes.len(),
            registry.skipped.len()
        );
        Ok(registry)
    }
}

/// Keys that must be present for a record to be usable, as JSON pointers.
const REQUIRED_FIELDS: &[&str] = &[
    "/flags/online",
    "/lastseen",
    "/nodeinfo/hostname",
    "/nodeinfo/network/mac",
    "/statistics",
];

const FIRMWARE_POINTER: &str = "/nodeinfo/software/firmware";

/// Decode one entry of `nodes`; `idx` names the node when it has no MAC
/// or hostname.
pub fn decode_node(idx: usize, value: Value) -> Result<Node> {
    let node = node_label(idx, &value);
    if let Some(pointer) = missing_required_field(&value) {
        return Err(RegistryError::MalformedRecord {
            node,
            path: dotted(&pointer),
            reason: "missing required field".to_string(),
        });
    }

    let record: NodeRecord = serde_path_to_error::deserialize(value).map_err(|err| {
        RegistryError::MalformedRecord {
            node,
            path: err.path().to_string(),
            reason: err.into_inner().to_string(),
        }
    })?;
    Node::prepare(record)
}

fn missing_required_field(value: &Value) -> Option<String> {
    for pointer in REQUIRED_FIELDS {
        if value.pointer(pointer).is_none() {
            return Some((*pointer).to_string());
        }
    }

    match value.pointer(FIRMWARE_POINTER) {
        Some(firmware) if !firmware.is_null() && firmware.get("release").is_none() => {
            Some(format!("{FIRMWARE_POINTER}/release"))
        }
        _ => None,
    }
}

fn node_label(idx: usize, value: &Value) -> String {
    ["/nodeinfo/network/mac", "/nodeinfo/hostname"]
        .iter()
        .find_map(|pointer| value.pointer(pointer).and_then(Value::as_str))
        .map_or_else(|| format!("#{idx}"), str::to_string)
}

fn dotted(pointer: &str) -> String {
    pointer.trim_start_matches('/').replace('/', ".")
}
