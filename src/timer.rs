//! Aggregation timer service (`spec.md` section 4.6 "Emission", section 5 "Suspension points").
//!
//! One dedicated background thread owns a min-heap of deadlines, woken by a condvar rather than
//! polling. The depth-engine aggregation window (`agg_ms`) is the only consumer today, but the
//! service is generic over any one-shot callback. A timer armed via [`TimerService::arm`] can be
//! cancelled or rescheduled by its [`TimerId`]; a stale heap entry left behind by a reschedule is
//! detected by generation number and skipped without firing.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TimerId(u64);

struct Entry {
    generation: u64,
    callback: Option<Box<dyn FnOnce() + Send>>,
}

struct SharedState {
    entries: HashMap<u64, Entry>,
    heap: BinaryHeap<Reverse<(Instant, u64, u64)>>,
    next_id: u64,
    shutdown: bool,
}

struct Shared {
    state: Mutex<SharedState>,
    condvar: Condvar,
}

/// A background-thread timer service. `stop()` is safe to call from any thread, including from
/// within a firing callback; a stop that races with a fire either lets the callback complete
/// entirely or prevents it from starting, never both.
pub struct TimerService {
    shared: Arc<Shared>,
    thread: Option<JoinHandle<()>>,
}

impl TimerService {
    pub fn new() -> Self {
        let shared = Arc::new(Shared {
            state: Mutex::new(SharedState {
                entries: HashMap::new(),
                heap: BinaryHeap::new(),
                next_id: 0,
                shutdown: false,
            }),
            condvar: Condvar::new(),
        });
        let worker = shared.clone();
        let thread = std::thread::spawn(move || run(worker));
        Self {
            shared,
            thread: Some(thread),
        }
    }

    /// Arms a one-shot timer that fires `delay` from now.
    pub fn arm(&self, delay: Duration, callback: impl FnOnce() + Send + 'static) -> TimerId {
        let mut state = self.shared.state.lock().unwrap();
        let id = state.next_id;
        state.next_id += 1;
        let deadline = Instant::now() + delay;
        state.entries.insert(
            id,
            Entry {
                generation: 0,
                callback: Some(Box::new(callback)),
            },
        );
        state.heap.push(Reverse((deadline, id, 0)));
        drop(state);
        self.shared.condvar.notify_all();
        TimerId(id)
    }

    /// Cancels a pending timer. A no-op if it already fired or was already cancelled.
    pub fn cancel(&self, id: TimerId) {
        let mut state = self.shared.state.lock().unwrap();
        state.entries.remove(&id.0);
        drop(state);
        self.shared.condvar.notify_all();
    }

    /// Reschedules a pending timer to fire `delay` from now, keeping its original callback. A
    /// no-op if the timer already fired.
    pub fn reschedule(&self, id: TimerId, delay: Duration) {
        let mut state = self.shared.state.lock().unwrap();
        let Some(entry) = state.entries.get_mut(&id.0) else {
            return;
        };
        entry.generation += 1;
        let generation = entry.generation;
        let deadline = Instant::now() + delay;
        state.heap.push(Reverse((deadline, id.0, generation)));
        drop(state);
        self.shared.condvar.notify_all();
    }

    /// Stops the background thread. Safe to call from any thread; idempotent.
    pub fn stop(&self) {
        let mut state = self.shared.state.lock().unwrap();
        state.shutdown = true;
        drop(state);
        self.shared.condvar.notify_all();
    }
}

impl Default for TimerService {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TimerService {
    fn drop(&mut self) {
        self.stop();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

fn run(shared: Arc<Shared>) {
    let mut state = shared.state.lock().unwrap();
    loop {
        if state.shutdown {
            return;
        }
        match state.heap.peek().copied() {
            None => {
                state = shared.condvar.wait(state).unwrap();
            }
            Some(Reverse((deadline, id, generation))) => {
                let now = Instant::now();
                if now >= deadline {
                    state.heap.pop();
                    let fire = matches!(state.entries.get(&id), Some(e) if e.generation == generation);
                    let callback = if fire {
                        state.entries.remove(&id).and_then(|e| e.callback)
                    } else {
                        None
                    };
                    drop(state);
                    if let Some(callback) = callback {
                        callback();
                    }
                    state = shared.state.lock().unwrap();
                } else {
                    let (guard, _timeout) =
                        shared.condvar.wait_timeout(state, deadline - now).unwrap();
                    state = guard;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn fires_after_delay() {
        let service = TimerService::new();
        let (tx, rx) = mpsc::channel();
        service.arm(Duration::from_millis(5), move || {
            let _ = tx.send(());
        });
        rx.recv_timeout(Duration::from_secs(1)).unwrap();
    }

    #[test]
    fn cancel_prevents_fire() {
        let service = TimerService::new();
        let (tx, rx) = mpsc::channel();
        let id = service.arm(Duration::from_millis(50), move || {
            let _ = tx.send(());
        });
        service.cancel(id);
        assert!(rx.recv_timeout(Duration::from_millis(150)).is_err());
    }

    #[test]
    fn reschedule_delays_fire_and_keeps_callback() {
        let service = TimerService::new();
        let (tx, rx) = mpsc::channel();
        let id = service.arm(Duration::from_millis(10), move || {
            let _ = tx.send(Instant::now());
        });
        service.reschedule(id, Duration::from_millis(60));
        let started = Instant::now();
        let fired_at = rx.recv_timeout(Duration::from_secs(1)).unwrap();
        assert!(fired_at.duration_since(started) >= Duration::from_millis(50));
    }
}
