use nodefinder_protocol::Node;

use crate::links::LinkTemplates;
use crate::matcher::{Filter, Namespace};
use crate::projector::Projection;

/// Registry nodes narrowed by zero or more filters, in registry order.
#[derive(Debug, Clone)]
pub struct NodeQuery<'a> {
    nodes: &'a [Node],
    filters: Vec<Filter>,
}

impl<'a> NodeQuery<'a> {
    pub fn new(nodes: &'a [Node]) -> Self {
        Self {
            nodes,
            filters: Vec::new(),
        }
    }

    /// Add one narrowing pass.
    #[must_use]
    pub fn filter(mut self, token: impl Into<String>) -> Self {
        self.filters.push(Filter::new(token));
        self
    }

    #[must_use]
    pub fn filters<I, S>(self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        tokens.into_iter().fold(self, Self::filter)
    }

    /// Run every pass over the survivors of the previous one. A node
    /// survives a pass at most once, however many namespaces it matches.
    pub fn run(&self) -> Vec<&'a Node> {
        let mut survivors: Vec<&'a Node> = self.nodes.iter().collect();
        for filter in &self.filters {
            let before = survivors.len();
            survivors.retain(|node| {
                let keep = filter.matches(node);
                if keep && log::log_enabled!(log::Level::Trace) {
                    let hits: Vec<&str> = filter
                        .matching_namespaces(node)
                        .into_iter()
                        .map(Namespace::as_str)
                        .collect();
                    log::trace!(
                        "{} kept by {:?} via {}",
                        node.mac(),
                        filter.token(),
                        hits.join(", ")
                    );
                }
                keep
            });
            log::debug!(
                "Filter {:?}: {} of {} nodes left",
                filter.token(),
                survivors.len(),
                before
            );
        }
        survivors
    }

    /// Projections of the surviving nodes. Facts are produced only when
    /// each projection is iterated.
    pub fn projections<'l>(
        &self,
        links: &'l LinkTemplates,
    ) -> impl Iterator<Item = Projection<'l>> + 'l
    where
        'a: 'l,
    {
        let survivors: Vec<&'l Node> = self.run();
        survivors
            .into_iter()
            .map(move |node| Projection::new(node, links))
    }
}
