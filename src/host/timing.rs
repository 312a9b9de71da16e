use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use chrono::Utc;

use super::{Clock, Scheduler};

/// Wall clock backed by `chrono`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Clock advanced explicitly by the caller. Clones share the same time.
#[derive(Debug, Default, Clone)]
pub struct ManualClock {
    now: Rc<Cell<i64>>,
}

impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
        }
    }

    pub fn set(&self, now_ms: i64) {
        self.now.set(now_ms);
    }

    pub fn advance(&self, dt: Duration) {
        let step = i64::try_from(dt.as_millis()).unwrap_or(i64::MAX);
        self.now.set(self.now.get().saturating_add(step));
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.get()
    }
}

struct PendingTask {
    due_ms: i64,
    seq: u64,
    task: Box<dyn FnOnce()>,
}

/// Deterministic scheduler driven by a [`ManualClock`].
///
/// Tasks run from [`ManualScheduler::advance`] in due-time order; ties run
/// in scheduling order.
#[derive(Clone)]
pub struct ManualScheduler {
    clock: ManualClock,
    pending: Rc<RefCell<Vec<PendingTask>>>,
    next_seq: Rc<Cell<u64>>,
}

impl ManualScheduler {
    pub fn new(clock: ManualClock) -> Self {
        Self {
            clock,
            pending: Rc::new(RefCell::new(Vec::new())),
            next_seq: Rc::new(Cell::new(0)),
        }
    }

    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Move the clock forward by `dt`, running every task that falls due.
    /// Returns how many tasks ran.
    pub fn advance(&self, dt: Duration) -> usize {
        let step = i64::try_from(dt.as_millis()).unwrap_or(i64::MAX);
        let target = self.clock.now_ms().saturating_add(step);
        let mut ran = 0;

        while let Some(next) = self.take_due(target) {
            if next.due_ms > self.clock.now_ms() {
                self.clock.set(next.due_ms);
            }
            (next.task)();
            ran += 1;
        }

        self.clock.set(target);
        ran
    }

    fn take_due(&self, target: i64) -> Option<PendingTask> {
        let mut pending = self.pending.borrow_mut();
        let index = pending
            .iter()
            .enumerate()
            .filter(|(_, task)| task.due_ms <= target)
            .min_by_key(|(_, task)| (task.due_ms, task.seq))
            .map(|(index, _)| index)?;
        Some(pending.remove(index))
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) {
        let step = i64::try_from(delay.as_millis()).unwrap_or(i64::MAX);
        let seq = self.next_seq.get();
        self.next_seq.set(seq + 1);
        self.pending.borrow_mut().push(PendingTask {
            due_ms: self.clock.now_ms().saturating_add(step),
            seq,
            task,
        });
    }
}

/// Native scheduler on the current tokio `LocalSet`.
///
/// Tasks are `!Send`, so [`Scheduler::schedule`] must be called from inside
/// `LocalSet::run_until` (or a `spawn_local`ed task).
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioScheduler;

#[cfg(not(target_arch = "wasm32"))]
impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) {
        tokio::task::spawn_local(async move {
            tokio::time::sleep(delay).await;
            task();
        });
    }
}
