//! Flattens one node record into an ordered list of labelled facts.
//!
//! The order is fixed by the projection itself; only mesh interfaces and
//! VPN peers follow the order of the registry document. Facts are produced
//! on demand, and every call to [`Projection::facts`] starts from the top.

use std::iter;

use nodefinder_protocol::{is_link_local, Autoupdater, Node, Software, Statistics};

use crate::fact::{Fact, Field};
use crate::gateway::{gateway_label, gateway_matches_peers};
use crate::links::LinkTemplates;
use crate::mac::strip_separators;

#[derive(Debug, Clone, Copy)]
pub struct Projection<'a> {
    node: &'a Node,
    links: &'a LinkTemplates,
}

impl<'a> Projection<'a> {
    pub fn new(node: &'a Node, links: &'a LinkTemplates) -> Self {
        Self { node, links }
    }

    pub fn facts(&self) -> impl Iterator<Item = Fact> + 'a {
        let node = self.node;
        let links = self.links;
        let record = node.record();
        let info = &record.nodeinfo;
        let network = &info.network;
        let stats = &record.statistics;
        let software = info.software.as_ref();

        let identity = iter::once_with(move || Fact::text(Field::Hostname, info.hostname.as_str()))
            .chain(iter::once_with(move || {
                Fact::text(Field::PrimaryMac, network.mac.as_str())
            }))
            .chain(iter::once_with(move || {
                Fact::text(Field::NodeId, node_id(&network.mac))
            }))
            .chain(iter::once_with(move || {
                Fact::text(Field::MapLink, links.map_link(&node_id(&network.mac)))
            }))
            .chain(iter::once_with(move || {
                Fact::text(Field::StatsLink, links.stats_link(&node_id(&network.mac)))
            }))
            .chain(iter::once_with(move || {
                Fact::text(Field::Online, record.flags.online.to_string())
            }));

        let addresses = node.addresses().unwrap_or_default().iter().map(|addr| {
            let field = if is_link_local(addr) {
                Field::LinkLocalAddress
            } else {
                Field::Address
            };
            Fact::address(field, *addr)
        });

        let lastseen =
            iter::once_with(move || Fact::text(Field::Lastseen, record.lastseen_text()));

        let secondary_macs = network
            .mesh_macs()
            .map(|(iface, mac)| Fact::text(Field::SecondaryMac, format!("{mac} ({iface})")));

        let metadata = optional(move || info.model().map(|model| Fact::text(Field::Model, model)))
            .chain(optional(move || {
                info.contact()
                    .map(|contact| Fact::text(Field::Owner, contact))
            }))
            .chain(optional(move || {
                info.site_code()
                    .map(|site| Fact::text(Field::SiteCode, site))
            }));

        let software_facts = optional(move || {
            let fastd = software?.fastd.as_ref()?;
            Some(Fact::text(Field::FastdEnabled, fastd.is_enabled().to_string()))
        })
        .chain(optional(move || {
            let base = software?.firmware.as_ref()?.base.as_deref()?;
            Some(Fact::text(Field::FirmwareBase, base))
        }))
        .chain(optional(move || {
            let firmware = software?.firmware.as_ref()?;
            Some(Fact::text(Field::FirmwareRelease, firmware.release.as_str()))
        }))
        .chain(optional(move || {
            let updater = reported_autoupdater(software?)?;
            Some(Fact::text(Field::AutoupdaterBranch, updater.branch()))
        }))
        .chain(optional(move || {
            let updater = reported_autoupdater(software?)?;
            Some(Fact::text(
                Field::AutoupdaterEnabled,
                updater.is_enabled().to_string(),
            ))
        }));

        let peers = stats
            .mesh_vpn
            .iter()
            .flat_map(|vpn| vpn.connected_peers())
            .map(|name| Fact::text(Field::FastdPeer, name));

        let uptime = optional(move || {
            stats
                .uptime
                .map(|seconds| Fact::text(Field::Uptime, format_uptime(seconds)))
        });

        let gateways = iter::once_with(move || gateway_facts(stats)).flatten();

        identity
            .chain(addresses)
            .chain(lastseen)
            .chain(secondary_macs)
            .chain(metadata)
            .chain(software_facts)
            .chain(peers)
            .chain(uptime)
            .chain(gateways)
    }
}

/// Facts of `node`, in projection order.
pub fn project<'a>(node: &'a Node, links: &'a LinkTemplates) -> impl Iterator<Item = Fact> + 'a {
    Projection::new(node, links).facts()
}

fn optional<F>(produce: F) -> impl Iterator<Item = Fact>
where
    F: FnOnce() -> Option<Fact>,
{
    iter::once_with(produce).flatten()
}

/// Node id used in links: the primary MAC without separators.
pub fn node_id(mac: &str) -> String {
    strip_separators(mac)
}

// Autoupdater facts are only reported for nodes that also report firmware.
fn reported_autoupdater(software: &Software) -> Option<&Autoupdater> {
    software.firmware.as_ref()?;
    software.autoupdater.as_ref()
}

fn gateway_facts(stats: &Statistics) -> Vec<Fact> {
    let mut facts = Vec::new();

    if let Some(mac) = stats.gateway.as_deref() {
        let label = gateway_label(mac);
        let mut peers = stats
            .mesh_vpn
            .iter()
            .flat_map(|vpn| vpn.connected_peers())
            .peekable();
        let has_peers = peers.peek().is_some();
        let reconciled = has_peers && gateway_matches_peers(&label, peers);

        facts.push(Fact::text(Field::DhcpGateway, label));
        if has_peers {
            facts.push(Fact::text(
                Field::GatewayMatchesFastd,
                reconciled.to_string(),
            ));
        }
    }

    if let Some(mac) = stats.gateway6.as_deref() {
        facts.push(Fact::text(Field::RadvGateway, gateway_label(mac)));
    }

    facts
}

/// `H:MM:SS`, prefixed with `N day(s), ` once the duration reaches a day.
/// Fractional seconds are truncated.
pub fn format_uptime(seconds: f64) -> String {
    let total = seconds.trunc() as i64;
    let days = total.div_euclid(86_400);
    let rest = total.rem_euclid(86_400);
    let clock = format!("{}:{:02}:{:02}", rest / 3_600, rest % 3_600 / 60, rest % 60);
    match days {
        0 => clock,
        1 | -1 => format!("{days} day, {clock}"),
        _ => format!("{days} days, {clock}"),
    }
}
