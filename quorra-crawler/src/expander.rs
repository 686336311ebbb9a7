use crate::error::{ExpandError, Result};
use async_trait::async_trait;
use std::collections::HashMap;

/// Opaque identifier for a crawlable unit. Equality defines identity for
/// deduplication purposes.
pub type NodeId = String;

/// What expanding one node yields: its content and its outgoing edges.
#[derive(Debug, Clone, Default)]
pub struct Expansion {
    pub content: String,
    pub edges: Vec<NodeId>,
}

/// Maps a node id to its content and outgoing edges.
///
/// Implementations may sit on network or disk I/O or an in-memory fixture;
/// the crawler only requires that failures come back as [`ExpandError`] so
/// they can be recorded without stopping the traversal.
#[async_trait]
pub trait Expander: Send + Sync {
    async fn expand(&self, id: &NodeId) -> Result<Expansion>;
}

/// Canned expander over a fixed in-memory graph.
///
/// Useful for tests and offline runs; unknown ids expand to
/// [`ExpandError::NotFound`].
#[derive(Debug, Clone, Default)]
pub struct FixtureExpander {
    nodes: HashMap<NodeId, Expansion>,
}

impl FixtureExpander {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node with its content and outgoing edges.
    pub fn node(mut self, id: &str, content: &str, edges: &[&str]) -> Self {
        self.nodes.insert(
            id.to_string(),
            Expansion {
                content: content.to_string(),
                edges: edges.iter().map(|edge| edge.to_string()).collect(),
            },
        );
        self
    }
}

#[async_trait]
impl Expander for FixtureExpander {
    async fn expand(&self, id: &NodeId) -> Result<Expansion> {
        match self.nodes.get(id) {
            Some(expansion) => Ok(expansion.clone()),
            None => Err(ExpandError::NotFound(id.clone())),
        }
    }
}
