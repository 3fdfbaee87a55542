//! Listener callback execution (`spec.md` section 4.7).
//!
//! Subscriptions run listener callbacks either inline on the dispatch thread or through a
//! configured [`Executor`]. [`InPlaceExecutor`] buffers submitted tasks and drains them only on
//! an explicit [`InPlaceExecutor::process_all_pending_tasks`] call, giving tests deterministic
//! control over when callbacks actually run (the original `IsolatedInPlaceExecutor`).

use std::collections::VecDeque;
use std::sync::Mutex;

/// Where a subscription's listener callbacks run.
pub trait Executor: Send + Sync {
    fn submit(&self, task: Box<dyn FnOnce() + Send>);
}

/// Runs every submitted task synchronously, on the calling thread, at submission time.
pub struct InlineExecutor;

impl Executor for InlineExecutor {
    fn submit(&self, task: Box<dyn FnOnce() + Send>) {
        task();
    }
}

/// Buffers submitted tasks until [`process_all_pending_tasks`](Self::process_all_pending_tasks)
/// is called. Used by tests that need deterministic control over listener invocation timing.
#[derive(Default)]
pub struct InPlaceExecutor {
    queue: Mutex<VecDeque<Box<dyn FnOnce() + Send>>>,
}

impl InPlaceExecutor {
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
        }
    }

    /// Runs every task queued so far, in submission order, including any tasks that those tasks
    /// themselves submit.
    pub fn process_all_pending_tasks(&self) {
        loop {
            let task = self.queue.lock().unwrap().pop_front();
            match task {
                Some(task) => task(),
                None => break,
            }
        }
    }

    pub fn pending_count(&self) -> usize {
        self.queue.lock().unwrap().len()
    }
}

impl Executor for InPlaceExecutor {
    fn submit(&self, task: Box<dyn FnOnce() + Send>) {
        self.queue.lock().unwrap().push_back(task);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn tasks_do_not_run_until_drained() {
        let executor = InPlaceExecutor::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let c = counter.clone();
        executor.submit(Box::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        executor.process_all_pending_tasks();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn tasks_submitted_during_drain_also_run() {
        let executor = Arc::new(InPlaceExecutor::new());
        let counter = Arc::new(AtomicUsize::new(0));
        let e = executor.clone();
        let c = counter.clone();
        executor.submit(Box::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
            let c2 = c.clone();
            e.submit(Box::new(move || {
                c2.fetch_add(1, Ordering::SeqCst);
            }));
        }));
        executor.process_all_pending_tasks();
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn inline_executor_runs_immediately() {
        let executor = InlineExecutor;
        let counter = Arc::new(AtomicUsize::new(0));
        let c = counter.clone();
        executor.submit(Box::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
