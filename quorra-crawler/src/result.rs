use crate::expander::NodeId;
use serde::{Deserialize, Serialize};

/// One successfully expanded node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlRecord {
    pub id: NodeId,
    pub content: String,
}

/// One node whose expansion failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlFailure {
    pub id: NodeId,
    pub reason: String,
}

impl CrawlFailure {
    pub fn new(id: NodeId, reason: String) -> Self {
        Self { id, reason }
    }
}

/// Everything a finished crawl produced.
///
/// A non-empty `failures` list still means the crawl itself completed:
/// per-node failures are data here, not errors. Both lists are unordered.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrawlOutcome {
    pub pages: Vec<CrawlRecord>,
    pub failures: Vec<CrawlFailure>,
}

impl CrawlOutcome {
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty() && self.failures.is_empty()
    }

    /// Looks up the record for `id`, if that node was visited successfully.
    pub fn page(&self, id: &str) -> Option<&CrawlRecord> {
        self.pages.iter().find(|page| page.id == id)
    }
}
