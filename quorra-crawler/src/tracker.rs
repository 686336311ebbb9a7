use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Counts units of work that have been scheduled but not yet finished.
///
/// The total is not known up front: running tasks register more work as
/// they discover it. [`wait`] returns once every registered unit has
/// reported done. Misuse - releasing more units than were registered, or a
/// second concurrent waiter - is a defect in the orchestration code and
/// panics rather than limping along on a corrupted count.
///
/// [`wait`]: CompletionTracker::wait
#[derive(Debug, Default)]
pub struct CompletionTracker {
    outstanding: Mutex<usize>,
    zero: Notify,
    waiting: AtomicBool,
}

impl CompletionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `n` more outstanding units.
    ///
    /// Must happen before the corresponding task is allowed to run, so the
    /// count can never transiently read zero while work is still on its
    /// way in. [`TaskSlot::claim`] enforces that ordering structurally.
    pub fn add(&self, n: usize) {
        let mut outstanding = self.outstanding.lock().expect("tracker lock poisoned");
        *outstanding += n;
    }

    /// Reports one unit finished.
    pub fn done(&self) {
        let mut outstanding = self.outstanding.lock().expect("tracker lock poisoned");
        assert!(*outstanding > 0, "done() called without a matching add()");
        *outstanding -= 1;
        if *outstanding == 0 {
            self.zero.notify_one();
        }
    }

    /// Units currently outstanding.
    pub fn outstanding(&self) -> usize {
        *self.outstanding.lock().expect("tracker lock poisoned")
    }

    /// Blocks until the outstanding count reaches zero.
    ///
    /// One waiter per tracker lifetime; the crawl driver owns this call.
    pub async fn wait(&self) {
        assert!(
            !self.waiting.swap(true, Ordering::SeqCst),
            "wait() called while another caller is already waiting"
        );
        loop {
            let notified = self.zero.notified();
            if self.outstanding() == 0 {
                return;
            }
            notified.await;
        }
    }
}

/// A claimed unit of outstanding work.
///
/// Claiming registers the unit with the tracker; dropping releases it. A
/// task that owns its slot therefore releases on every exit path, and a
/// parent that claims the slot before spawning the child guarantees the
/// registration happens before the child ever runs.
#[derive(Debug)]
pub struct TaskSlot {
    tracker: Arc<CompletionTracker>,
}

impl TaskSlot {
    pub fn claim(tracker: Arc<CompletionTracker>) -> Self {
        tracker.add(1);
        Self { tracker }
    }
}

impl Drop for TaskSlot {
    fn drop(&mut self) {
        self.tracker.done();
    }
}
