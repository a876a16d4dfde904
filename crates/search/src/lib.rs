//! Matching and projection over mesh node records.
//!
//! A [`NodeQuery`] narrows the registry with one [`Filter`] per search
//! token, then hands out a [`Projection`] per surviving node.

mod error;
mod fact;
pub mod gateway;
mod links;
mod mac;
mod matcher;
mod pipeline;
mod projector;

#[cfg(test)]
mod test_support;

pub use error::{Result, SearchError};
pub use fact::{Fact, FactValue, Field};
pub use gateway::{gateway_label, gateway_matches_peers, site_of};
pub use links::{LinkTemplates, DEFAULT_MAP_LINK, DEFAULT_STATS_LINK, NODE_ID_PLACEHOLDER};
pub use mac::{mac_eq, strip_separators};
pub use matcher::{matches, Filter, Namespace, EXACT_HOSTNAME_PREFIX};
pub use pipeline::NodeQuery;
pub use projector::{format_uptime, node_id, project, Projection};
