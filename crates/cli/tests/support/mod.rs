#![allow(dead_code)]

use assert_cmd::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

/// A cached registry plus a config file in a scratch directory. The
/// upstream points at an unroutable address so nothing is downloaded.
pub struct Fixture {
    pub dir: TempDir,
}

impl Fixture {
    pub fn with_nodes(nodes: Vec<Value>) -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        fs::write(
            dir.path().join("nodes.json"),
            serde_json::to_vec(&json!({"version": 2, "nodes": nodes})).expect("registry json"),
        )
        .expect("write registry");
        fs::write(
            dir.path().join("config.toml"),
            "[links]\nmap = \"https://map.example/{node_id}\"\n",
        )
        .expect("write config");
        Self { dir }
    }

    pub fn cache_file(&self) -> PathBuf {
        self.dir.path().join("nodes.json")
    }

    #[allow(deprecated)]
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("nodefinder").expect("nodefinder binary");
        cmd.env("NODEFINDER_UPSTREAM", "http://127.0.0.1:9/nodes.json")
            .env_remove("RUST_LOG")
            .arg("--config")
            .arg(self.dir.path().join("config.toml"))
            .arg("--cache-file")
            .arg(self.cache_file());
        cmd
    }

    pub fn stdout(&self, args: &[&str]) -> String {
        let output = self.command().args(args).output().expect("command run");
        assert!(
            output.status.success(),
            "stdout: {}\nstderr: {}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8(output.stdout).expect("utf8 stdout")
    }
}

pub fn node(mac: &str, hostname: &str) -> Value {
    json!({
        "flags": {"online": true},
        "lastseen": "2024-05-01T10:00:00+0000",
        "nodeinfo": {
            "hostname": hostname,
            "network": {"mac": mac, "addresses": ["2001:db8::10"]}
        },
        "statistics": {}
    })
}

/// A gateway-side router and an edge router with two mesh MACs.
pub fn sample_registry() -> Vec<Value> {
    let mut core = node("88:e6:40:ba:10:05", "gw-core-1");
    core["nodeinfo"]["software"] = json!({
        "firmware": {"base": "gluon-v2023.2.3", "release": "2.4.1+ffh"},
        "autoupdater": {"branch": "stable", "enabled": true}
    });
    core["statistics"] = json!({
        "uptime": 3725.2,
        "gateway": "88:e6:40:20:10:33",
        "mesh_vpn": {"groups": {"backbone": {"peers": {"gw01": {"established": 5}}}}}
    });

    let mut edge = node("aa:bb:cc:00:00:02", "Edge Router");
    edge["nodeinfo"]["network"]["addresses"] = json!(["fe80::1", "2001:db8::20"]);
    edge["nodeinfo"]["network"]["mesh"] = json!({"bat0": {"interfaces": {
        "wireless": ["aa:bb:cc:00:01:01"],
        "tunnel": ["aa:bb:cc:00:01:02"]
    }}});
    edge["nodeinfo"]["software"] = json!({
        "firmware": {"release": "2.4.1+ffh"},
        "autoupdater": {"branch": "beta"}
    });

    vec![core, edge]
}
