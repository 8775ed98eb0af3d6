//! Deferred work for the single-threaded surface event loop.
//!
//! Two suspension kinds exist: fixed-delay timers and idle slots (run once
//! the loop has nothing more urgent to do). Every task is tied to a
//! [`CancellationToken`]; a task whose token is cancelled before it runs is
//! skipped, which lets a panel drop the leftovers of a superseded transition.

use std::{
    cell::RefCell,
    collections::{BTreeMap, VecDeque},
    time::Duration,
};

use tokio_util::sync::CancellationToken;
use tracing::trace;

pub type Task = Box<dyn FnOnce() + 'static>;

pub trait Scheduler {
    fn schedule_after(&self, delay: Duration, token: &CancellationToken, task: Task);
    fn schedule_idle(&self, token: &CancellationToken, task: Task);
}

struct Entry {
    token: CancellationToken,
    task: Task,
}

impl Entry {
    fn run(self) {
        if self.token.is_cancelled() {
            trace!("skipping cancelled task");
            return;
        }
        (self.task)();
    }
}

#[derive(Default)]
struct LoopState {
    now: Duration,
    seq: u64,
    timers: BTreeMap<(Duration, u64), Entry>,
    idle: VecDeque<Entry>,
}

/// Deterministic event loop driven by an explicit virtual clock.
#[derive(Default)]
pub struct ManualScheduler {
    state: RefCell<LoopState>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.state.borrow().now
    }

    /// Timers and idle slots not yet run, cancelled ones included.
    pub fn pending(&self) -> usize {
        let state = self.state.borrow();
        state.timers.len() + state.idle.len()
    }

    /// Runs idle slots at the current instant, including ones they enqueue.
    pub fn run_idle(&self) {
        loop {
            let next = self.state.borrow_mut().idle.pop_front();
            match next {
                Some(entry) => entry.run(),
                None => break,
            }
        }
    }

    /// Moves the clock forward by `by`, running due timers in order and
    /// draining idle slots before each step of time.
    pub fn advance(&self, by: Duration) {
        let target = self.now() + by;
        loop {
            self.run_idle();
            let next = {
                let mut state = self.state.borrow_mut();
                let due = matches!(
                    state.timers.first_key_value(),
                    Some(((at, _), _)) if *at <= target
                );
                if due {
                    state.timers.pop_first()
                } else {
                    None
                }
            };
            match next {
                Some(((at, _), entry)) => {
                    self.state.borrow_mut().now = at;
                    entry.run();
                }
                None => break,
            }
        }
        self.state.borrow_mut().now = target;
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_after(&self, delay: Duration, token: &CancellationToken, task: Task) {
        let mut state = self.state.borrow_mut();
        let at = state.now + delay;
        let seq = state.seq;
        state.seq += 1;
        state.timers.insert(
            (at, seq),
            Entry {
                token: token.clone(),
                task,
            },
        );
    }

    fn schedule_idle(&self, token: &CancellationToken, task: Task) {
        self.state.borrow_mut().idle.push_back(Entry {
            token: token.clone(),
            task,
        });
    }
}

/// Runs tasks on the current tokio `LocalSet`.
///
/// Must be used from inside `LocalSet::run_until` (or a task spawned on it).
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioScheduler;

impl Scheduler for TokioScheduler {
    fn schedule_after(&self, delay: Duration, token: &CancellationToken, task: Task) {
        let token = token.clone();
        tokio::task::spawn_local(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }
            Entry { token, task }.run();
        });
    }

    fn schedule_idle(&self, token: &CancellationToken, task: Task) {
        let token = token.clone();
        tokio::task::spawn_local(async move {
            tokio::task::yield_now().await;
            Entry { token, task }.run();
        });
    }
}

#[cfg(test)]
#[path = "tests/scheduler_tests.rs"]
mod tests;
