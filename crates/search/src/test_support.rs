use nodefinder_protocol::{decode_node, Node};
use serde_json::{json, Value};

/// A node with only the required keys set.
pub(crate) fn bare_node(mac: &str, hostname: &str) -> Value {
    json!({
        "flags": {"online": true},
        "lastseen": "2024-05-01T10:00:00+0000",
        "nodeinfo": {
            "hostname": hostname,
            "network": {"mac": mac}
        },
        "statistics": {}
    })
}

pub(crate) fn node(value: Value) -> Node {
    decode_node(0, value).expect("test node decodes")
}
