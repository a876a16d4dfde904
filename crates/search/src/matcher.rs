use std::net::IpAddr;

use nodefinder_protocol::Node;

use crate::mac::mac_eq;

/// Token prefix that switches hostname matching from substring to exact.
pub const EXACT_HOSTNAME_PREFIX: &str = "==";

/// Identifier namespaces a search token is tried against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    FirmwareRelease,
    AutoupdaterBranch,
    ExactHostname,
    Hostname,
    PrimaryMac,
    Address,
    SecondaryMac,
}

impl Namespace {
    pub const ALL: [Namespace; 7] = [
        Namespace::FirmwareRelease,
        Namespace::AutoupdaterBranch,
        Namespace::ExactHostname,
        Namespace::Hostname,
        Namespace::PrimaryMac,
        Namespace::Address,
        Namespace::SecondaryMac,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Namespace::FirmwareRelease => "firmware-release",
            Namespace::AutoupdaterBranch => "autoupdater-branch",
            Namespace::ExactHostname => "exact-hostname",
            Namespace::Hostname => "hostname",
            Namespace::PrimaryMac => "primary-mac",
            Namespace::Address => "address",
            Namespace::SecondaryMac => "secondary-mac",
        }
    }
}

/// One search token, pre-digested for matching against many nodes.
#[derive(Debug, Clone)]
pub struct Filter {
    token: String,
    lowered: String,
    exact_hostname: Option<String>,
    address: Option<IpAddr>,
}

impl Filter {
    pub fn new(token: impl Into<String>) -> Self {
        let token = token.into();
        let lowered = token.to_lowercase();
        let exact_hostname = token
            .strip_prefix(EXACT_HOSTNAME_PREFIX)
            .map(str::to_lowercase);
        let address = token.parse().ok();
        Self {
            token,
            lowered,
            exact_hostname,
            address,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// A node matches when any namespace matches.
    pub fn matches(&self, node: &Node) -> bool {
        Namespace::ALL
            .iter()
            .any(|namespace| self.matches_in(node, *namespace))
    }

    /// Namespaces the node matches in, in [`Namespace::ALL`] order.
    pub fn matching_namespaces(&self, node: &Node) -> Vec<Namespace> {
        Namespace::ALL
            .into_iter()
            .filter(|namespace| self.matches_in(node, *namespace))
            .collect()
    }

    pub fn matches_in(&self, node: &Node, namespace: Namespace) -> bool {
        let info = &node.record().nodeinfo;
        let network = &info.network;
        match namespace {
            Namespace::FirmwareRelease => info
                .firmware()
                .is_some_and(|firmware| firmware.release == self.token),
            Namespace::AutoupdaterBranch => info
                .autoupdater()
                .is_some_and(|updater| updater.branch() == self.token),
            Namespace::ExactHostname => self
                .exact_hostname
                .as_deref()
                .is_some_and(|wanted| wanted == info.hostname.to_lowercase()),
            Namespace::Hostname => info.hostname.to_lowercase().contains(&self.lowered),
            Namespace::PrimaryMac => mac_eq(&self.token, &network.mac),
            Namespace::Address => {
                let Some(address) = self.address else {
                    return false;
                };
                let on_mesh_interface = network.mesh_interfaces.as_ref().is_some_and(|ifaces| {
                    ifaces
                        .iter()
                        .any(|iface| iface.parse::<IpAddr>().is_ok_and(|ip| ip == address))
                });
                on_mesh_interface
                    || node
                        .addresses()
                        .is_some_and(|addresses| addresses.contains(&address))
            }
            Namespace::SecondaryMac => network
                .mesh_macs()
                .any(|(_, mac)| mac_eq(&self.token, mac)),
        }
    }
}

/// Whether `node` matches `token` in any namespace.
pub fn matches(node: &Node, token: &str) -> bool {
    Filter::new(token).matches(node)
}
