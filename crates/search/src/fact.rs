use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::error::SearchError;

/// Label of a projected fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Hostname,
    PrimaryMac,
    NodeId,
    MapLink,
    StatsLink,
    Online,
    LinkLocalAddress,
    Address,
    Lastseen,
    SecondaryMac,
    Model,
    Owner,
    SiteCode,
    FastdEnabled,
    FirmwareBase,
    FirmwareRelease,
    AutoupdaterBranch,
    AutoupdaterEnabled,
    FastdPeer,
    Uptime,
    DhcpGateway,
    GatewayMatchesFastd,
    RadvGateway,
}

impl Field {
    pub const ALL: [Field; 23] = [
        Field::Hostname,
        Field::PrimaryMac,
        Field::NodeId,
        Field::MapLink,
        Field::StatsLink,
        Field::Online,
        Field::LinkLocalAddress,
        Field::Address,
        Field::Lastseen,
        Field::SecondaryMac,
        Field::Model,
        Field::Owner,
        Field::SiteCode,
        Field::FastdEnabled,
        Field::FirmwareBase,
        Field::FirmwareRelease,
        Field::AutoupdaterBranch,
        Field::AutoupdaterEnabled,
        Field::FastdPeer,
        Field::Uptime,
        Field::DhcpGateway,
        Field::GatewayMatchesFastd,
        Field::RadvGateway,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Field::Hostname => "hostname",
            Field::PrimaryMac => "primary-mac",
            Field::NodeId => "node-id",
            Field::MapLink => "map-link",
            Field::StatsLink => "stats-link",
            Field::Online => "online",
            Field::LinkLocalAddress => "ll-addr",
            Field::Address => "addr",
            Field::Lastseen => "lastseen",
            Field::SecondaryMac => "secondary-mac",
            Field::Model => "model",
            Field::Owner => "owner",
            Field::SiteCode => "site_code",
            Field::FastdEnabled => "fastd_enabled",
            Field::FirmwareBase => "firmware_base",
            Field::FirmwareRelease => "firmware_rel",
            Field::AutoupdaterBranch => "autoupdater_br",
            Field::AutoupdaterEnabled => "autoupdater_en",
            Field::FastdPeer => "fastd_sn",
            Field::Uptime => "uptime",
            Field::DhcpGateway => "dhcp_gateway",
            Field::GatewayMatchesFastd => "gw_eq_fastd",
            Field::RadvGateway => "radv_gateway",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Field {
    type Err = SearchError;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|field| field.as_str() == label)
            .ok_or_else(|| SearchError::UnknownField(label.to_string()))
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FactValue {
    Text(String),
    Address(IpAddr),
}

impl fmt::Display for FactValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactValue::Text(text) => f.pad(text),
            FactValue::Address(addr) => fmt::Display::fmt(addr, f),
        }
    }
}

impl Serialize for FactValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fact {
    pub field: Field,
    pub value: FactValue,
}

impl Fact {
    pub fn text(field: Field, value: impl Into<String>) -> Self {
        Self {
            field,
            value: FactValue::Text(value.into()),
        }
    }

    pub fn address(field: Field, addr: IpAddr) -> Self {
        Self {
            field,
            value: FactValue::Address(addr),
        }
    }

    pub fn label(&self) -> &'static str {
        self.field.as_str()
    }
}

impl Serialize for Fact {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Fact", 2)?;
        state.serialize_field("label", &self.field)?;
        state.serialize_field("value", &self.value)?;
        state.end()
    }
}
