use crate::expander::{Expander, NodeId};
use crate::ledger::VisitLedger;
use crate::result::{CrawlFailure, CrawlOutcome, CrawlRecord};
use crate::tracker::{CompletionTracker, TaskSlot};
use futures::FutureExt;
use futures::future::BoxFuture;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Called once per claimed node, just before its expansion starts.
pub type ProgressCallback = Arc<dyn Fn(NodeId) + Send + Sync>;

/// Depth-bounded concurrent crawler with exactly-once visits.
///
/// Every node reachable within the depth budget is expanded at most once,
/// no matter how many edges lead to it or how the scheduler interleaves
/// the tasks. The graph is discovered during the traversal itself: each
/// expanded node fans out one task per outgoing edge, and the crawl is
/// finished when that dynamically grown set of tasks has drained.
pub struct Crawler {
    expander: Arc<dyn Expander>,
    max_depth: usize,
    progress_callback: Option<ProgressCallback>,
}

/// Shared state for one `crawl` invocation. Ledger, tracker and sinks live
/// exactly as long as the call that created them.
struct CrawlState {
    expander: Arc<dyn Expander>,
    ledger: VisitLedger,
    tracker: Arc<CompletionTracker>,
    pages: Mutex<Vec<CrawlRecord>>,
    failures: Mutex<Vec<CrawlFailure>>,
    progress_callback: Option<ProgressCallback>,
}

impl Crawler {
    pub fn new(expander: Arc<dyn Expander>) -> Self {
        Self {
            expander,
            max_depth: 3,
            progress_callback: None,
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Crawls the graph reachable from `root` within the depth budget.
    ///
    /// Returns once every spawned task has finished, at which point the
    /// sinks are final. A per-node expansion failure lands in
    /// [`CrawlOutcome::failures`] and never aborts the traversal; with a
    /// depth budget of zero the expander is not invoked at all and both
    /// sinks come back empty. Concurrent `crawl` calls on the same
    /// `Crawler` do not share visit state.
    pub async fn crawl(&self, root: impl Into<NodeId>) -> CrawlOutcome {
        let root = root.into();
        info!(root = %root, max_depth = self.max_depth, "starting crawl");

        let state = Arc::new(CrawlState {
            expander: self.expander.clone(),
            ledger: VisitLedger::new(),
            tracker: Arc::new(CompletionTracker::new()),
            pages: Mutex::new(Vec::new()),
            failures: Mutex::new(Vec::new()),
            progress_callback: self.progress_callback.clone(),
        });

        let slot = TaskSlot::claim(state.tracker.clone());
        tokio::spawn(visit(state.clone(), root, self.max_depth, slot));
        state.tracker.wait().await;

        let pages = std::mem::take(&mut *state.pages.lock().expect("page sink lock poisoned"));
        let failures =
            std::mem::take(&mut *state.failures.lock().expect("failure sink lock poisoned"));
        info!(
            pages = pages.len(),
            failures = failures.len(),
            "crawl complete"
        );
        CrawlOutcome { pages, failures }
    }
}

/// One unit of crawl work: expand a single node, then fan out.
///
/// The slot was claimed by the parent and is released when this future is
/// done with it, so the tracker can never transiently read zero while a
/// task is still on its way in. Boxed because the recursion goes through
/// `tokio::spawn`.
fn visit(
    state: Arc<CrawlState>,
    id: NodeId,
    depth: usize,
    slot: TaskSlot,
) -> BoxFuture<'static, ()> {
    async move {
        let _slot = slot;

        if depth == 0 {
            return;
        }
        if !state.ledger.try_claim(&id) {
            debug!(node = %id, "already claimed, skipping");
            return;
        }
        if let Some(callback) = &state.progress_callback {
            callback(id.clone());
        }

        match state.expander.expand(&id).await {
            Ok(expansion) => {
                debug!(node = %id, edges = expansion.edges.len(), "expanded");
                state
                    .pages
                    .lock()
                    .expect("page sink lock poisoned")
                    .push(CrawlRecord {
                        id: id.clone(),
                        content: expansion.content,
                    });

                // Duplicate or already-visited edges are filtered by the
                // child's own claim, not here.
                for edge in expansion.edges {
                    let child = TaskSlot::claim(state.tracker.clone());
                    tokio::spawn(visit(state.clone(), edge, depth - 1, child));
                }
            }
            Err(err) => {
                warn!(node = %id, error = %err, "expansion failed");
                state
                    .failures
                    .lock()
                    .expect("failure sink lock poisoned")
                    .push(CrawlFailure::new(id, err.to_string()));
            }
        }
    }
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::expander::{Expansion, FixtureExpander};
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// Wraps an expander and counts how many times each node is expanded.
    struct CountingExpander<E> {
        inner: E,
        calls: Mutex<HashMap<NodeId, usize>>,
    }

    impl<E> CountingExpander<E> {
        fn new(inner: E) -> Self {
            Self {
                inner,
                calls: Mutex::new(HashMap::new()),
            }
        }

        fn calls_for(&self, id: &str) -> usize {
            self.calls.lock().unwrap().get(id).copied().unwrap_or(0)
        }

        fn total_calls(&self) -> usize {
            self.calls.lock().unwrap().values().sum()
        }
    }

    #[async_trait]
    impl<E: Expander> Expander for CountingExpander<E> {
        async fn expand(&self, id: &NodeId) -> Result<Expansion> {
            *self.calls.lock().unwrap().entry(id.clone()).or_insert(0) += 1;
            self.inner.expand(id).await
        }
    }

    /// A links to B and C; B and C link back to A and onwards to D.
    fn diamond_graph() -> FixtureExpander {
        FixtureExpander::new()
            .node("A", "alpha", &["B", "C"])
            .node("B", "beta", &["A", "D"])
            .node("C", "gamma", &["A"])
            .node("D", "delta", &[])
    }

    fn sorted_ids(outcome: &CrawlOutcome) -> Vec<&str> {
        let mut ids: Vec<&str> = outcome.pages.iter().map(|page| page.id.as_str()).collect();
        ids.sort_unstable();
        ids
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_every_reachable_node_visited_exactly_once() {
        let expander = Arc::new(CountingExpander::new(diamond_graph()));
        let crawler = Crawler::new(expander.clone()).with_max_depth(3);

        let outcome = crawler.crawl("A").await;

        assert_eq!(sorted_ids(&outcome), vec!["A", "B", "C", "D"]);
        assert!(outcome.failures.is_empty());
        for id in ["A", "B", "C", "D"] {
            assert_eq!(expander.calls_for(id), 1, "{id} expanded more than once");
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_exactly_once_survives_racing_interleavings() {
        // The cycle back into A is the interesting part: B and C race to
        // re-claim it on every run.
        for _ in 0..200 {
            let expander = Arc::new(CountingExpander::new(diamond_graph()));
            let crawler = Crawler::new(expander.clone()).with_max_depth(3);

            let outcome = crawler.crawl("A").await;

            assert_eq!(outcome.pages.len(), 4);
            assert!(outcome.failures.is_empty());
            assert_eq!(expander.total_calls(), 4);
        }
    }

    #[tokio::test]
    async fn test_depth_zero_never_invokes_expander() {
        let expander = Arc::new(CountingExpander::new(diamond_graph()));
        let crawler = Crawler::new(expander.clone()).with_max_depth(0);

        let outcome = crawler.crawl("A").await;

        assert!(outcome.is_empty());
        assert_eq!(expander.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_depth_budget_bounds_the_frontier() {
        let expander = Arc::new(
            FixtureExpander::new()
                .node("n0", "zero", &["n1"])
                .node("n1", "one", &["n2"])
                .node("n2", "two", &["n3"])
                .node("n3", "three", &["n4"])
                .node("n4", "four", &[]),
        );
        let crawler = Crawler::new(expander).with_max_depth(3);

        let outcome = crawler.crawl("n0").await;

        assert_eq!(sorted_ids(&outcome), vec!["n0", "n1", "n2"]);
        assert!(outcome.failures.is_empty());
    }

    #[tokio::test]
    async fn test_failed_node_does_not_abort_siblings() {
        // "broken" is not in the fixture, so its expansion fails.
        let expander = Arc::new(
            FixtureExpander::new()
                .node("root", "r", &["broken", "ok"])
                .node("ok", "fine", &[]),
        );
        let crawler = Crawler::new(expander).with_max_depth(2);

        let outcome = crawler.crawl("root").await;

        assert_eq!(sorted_ids(&outcome), vec!["ok", "root"]);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].id, "broken");
        assert!(outcome.failures[0].reason.contains("not found"));
    }

    #[tokio::test]
    async fn test_missing_root_is_recorded_not_fatal() {
        let crawler = Crawler::new(Arc::new(FixtureExpander::new())).with_max_depth(3);

        let outcome = crawler.crawl("ghost").await;

        assert!(outcome.pages.is_empty());
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].id, "ghost");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_duplicate_edges_claimed_once() {
        let expander = Arc::new(CountingExpander::new(
            FixtureExpander::new()
                .node("hub", "h", &["leaf", "leaf", "leaf"])
                .node("leaf", "l", &[]),
        ));
        let crawler = Crawler::new(expander.clone()).with_max_depth(2);

        let outcome = crawler.crawl("hub").await;

        assert_eq!(outcome.pages.len(), 2);
        assert_eq!(expander.calls_for("leaf"), 1);
    }

    #[tokio::test]
    async fn test_progress_reported_once_per_claimed_node() {
        let seen: Arc<Mutex<Vec<NodeId>>> = Arc::new(Mutex::new(Vec::new()));
        let seen_in_callback = seen.clone();
        let crawler = Crawler::new(Arc::new(diamond_graph()))
            .with_max_depth(3)
            .with_progress_callback(Arc::new(move |id| {
                seen_in_callback.lock().unwrap().push(id);
            }));

        crawler.crawl("A").await;

        let mut seen = seen.lock().unwrap().clone();
        seen.sort_unstable();
        assert_eq!(seen, vec!["A", "B", "C", "D"]);
    }

    #[tokio::test]
    async fn test_fresh_visit_state_per_crawl() {
        let expander = Arc::new(CountingExpander::new(diamond_graph()));
        let crawler = Crawler::new(expander.clone()).with_max_depth(3);

        crawler.crawl("A").await;
        let second = crawler.crawl("A").await;

        // The second crawl starts from a clean ledger, not the first one's.
        assert_eq!(second.pages.len(), 4);
        assert_eq!(expander.calls_for("A"), 2);
    }
}
