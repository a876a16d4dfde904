use serde::{Deserialize, Serialize};

/// Placeholder substituted with the node id in link templates.
pub const NODE_ID_PLACEHOLDER: &str = "{node_id}";

pub const DEFAULT_MAP_LINK: &str = "https://hannover.freifunk.net/karte/#/de/map/{node_id}";
pub const DEFAULT_STATS_LINK: &str =
    "https://stats.ffh.zone/d/000000021/router-fur-meshviewer?var-node={node_id}";

/// URL templates for the `map-link` and `stats-link` facts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinkTemplates {
    pub map: String,
    pub stats: String,
}

impl Default for LinkTemplates {
    fn default() -> Self {
        Self {
            map: DEFAULT_MAP_LINK.to_string(),
            stats: DEFAULT_STATS_LINK.to_string(),
        }
    }
}

impl LinkTemplates {
    pub fn map_link(&self, node_id: &str) -> String {
        self.map.replace(NODE_ID_PLACEHOLDER, node_id)
    }

    pub fn stats_link(&self, node_id: &str) -> String {
        self.stats.replace(NODE_ID_PLACEHOLDER, node_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_templates_render_node_id() {
        let links = LinkTemplates::default();
        assert_eq!(
            links.map_link("88e640ba1005"),
            "https://hannover.freifunk.net/karte/#/de/map/88e640ba1005"
        );
        assert_eq!(
            links.stats_link("88e640ba1005"),
            "https://stats.ffh.zone/d/000000021/router-fur-meshviewer?var-node=88e640ba1005"
        );
    }

    #[test]
    fn custom_template_may_repeat_placeholder() {
        let links = LinkTemplates {
            map: "https://map.example/{node_id}?focus={node_id}".to_string(),
            ..LinkTemplates::default()
        };
        assert_eq!(links.map_link("ab"), "https://map.example/ab?focus=ab");
    }
}
