use crate::expander::NodeId;
use std::collections::HashSet;
use std::sync::Mutex;

/// The set of node ids that have been claimed for expansion.
///
/// The only mutating operation is [`try_claim`]: the check and the mark
/// happen under a single lock acquisition, and the underlying set is never
/// handed out, so a claimed id can never be unclaimed and no caller can do
/// a raw read-then-write around the lock.
///
/// [`try_claim`]: VisitLedger::try_claim
#[derive(Debug, Default)]
pub struct VisitLedger {
    claimed: Mutex<HashSet<NodeId>>,
}

impl VisitLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `id` for the calling task.
    ///
    /// Returns `true` for exactly one caller per distinct id - the first -
    /// and `false` for every later or racing caller.
    pub fn try_claim(&self, id: &NodeId) -> bool {
        let mut claimed = self.claimed.lock().expect("visit ledger lock poisoned");
        claimed.insert(id.clone())
    }

    /// Number of ids claimed so far.
    pub fn len(&self) -> usize {
        self.claimed.lock().expect("visit ledger lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
