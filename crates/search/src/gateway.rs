//! Gateway MAC to site label table.
//!
//! Each site owns one `XY` octet (`10`, `20`, .., `a0` for `sn01`..`sn10`)
//! under two uplink hardware prefixes, and every trailing octet below it.
//! Both prefixes map to the same ten labels.

use std::collections::HashMap;

use once_cell::sync::Lazy;

const GATEWAY_PREFIXES: [&str; 2] = ["88:e6:40:ba", "88:e6:40:20"];

const SITE_LABELS: [&str; 10] = [
    "sn01", "sn02", "sn03", "sn04", "sn05", "sn06", "sn07", "sn08", "sn09", "sn10",
];

static GATEWAY_SITES: Lazy<HashMap<String, &'static str>> = Lazy::new(build_table);

fn build_table() -> HashMap<String, &'static str> {
    let mut table =
        HashMap::with_capacity(GATEWAY_PREFIXES.len() * SITE_LABELS.len() * 256);
    for prefix in GATEWAY_PREFIXES {
        for (idx, label) in SITE_LABELS.iter().enumerate() {
            let site_octet = (idx + 1) * 0x10;
            for host_octet in 0..=u8::MAX {
                table.insert(format!("{prefix}:{site_octet:02x}:{host_octet:02x}"), *label);
            }
        }
    }
    log::debug!("Built gateway site table with {} entries", table.len());
    table
}

/// The process-wide table, built on first use.
pub fn gateway_sites() -> &'static HashMap<String, &'static str> {
    &GATEWAY_SITES
}

/// Site label for an exact gateway MAC (lowercase, colon separated).
pub fn site_of(mac: &str) -> Option<&'static str> {
    GATEWAY_SITES.get(mac).copied()
}

/// Site label, or a marker carrying the raw MAC when it is not a known
/// gateway.
pub fn gateway_label(mac: &str) -> String {
    match site_of(mac) {
        Some(label) => label.to_string(),
        None => format!("unknown mac! ({mac})"),
    }
}

fn strip_site_markers(name: &str) -> String {
    name.replace("gw", "").replace("sn", "")
}

/// Whether the gateway label names the same site as one of the peers,
/// ignoring the `gw` / `sn` naming prefixes on both sides.
pub fn gateway_matches_peers<'p>(label: &str, peers: impl IntoIterator<Item = &'p str>) -> bool {
    let wanted = strip_site_markers(label);
    peers
        .into_iter()
        .any(|peer| strip_site_markers(peer) == wanted)
}
