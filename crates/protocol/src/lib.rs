//! Registry document model for the mesh node finder.
//!
//! [`Registry::from_slice`] decodes the upstream `nodes.json` one node at a
//! time, so a broken record is reported with the node it belongs to.

mod error;
pub mod model;
mod registry;

pub use error::{RegistryError, Result};
pub use model::{
    Autoupdater, Fastd, Firmware, Flags, Hardware, MeshDefinition, MeshVpn, MeshVpnGroups,
    Network, NodeInfo, NodeRecord, Owner, PeerGroup, PeerTable, Software, Statistics, System,
    AUTOUPDATER_BRANCH_FALLBACK,
};
pub use registry::{
    decode_node, is_link_local, mac_digits, strip_separators, MalformedPolicy, Node, Registry,
};
