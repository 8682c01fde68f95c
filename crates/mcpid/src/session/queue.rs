//! Unbounded FIFO of outbound lines with an interruptible blocking take.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// Lines waiting to be written to a client, in send order.
///
/// Any number of threads may push; one consumer takes. [`interrupt`]
/// releases a blocked consumer for good and discards whatever is still
/// queued.
///
/// [`interrupt`]: OutputQueue::interrupt
#[derive(Debug, Default)]
pub struct OutputQueue {
    state: Mutex<QueueState>,
    ready: Condvar,
}

#[derive(Debug, Default)]
struct QueueState {
    lines: VecDeque<String>,
    interrupted: bool,
}

impl OutputQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a line. Never blocks on the consumer; lines pushed after an
    /// interrupt are dropped.
    pub fn push(&self, line: String) {
        let mut state = self.lock();
        if state.interrupted {
            return;
        }
        state.lines.push_back(line);
        drop(state);
        self.ready.notify_one();
    }

    /// Removes the oldest line, blocking while the queue is empty. Returns
    /// `None` once the queue has been interrupted.
    #[must_use]
    pub fn take(&self) -> Option<String> {
        let mut state = self.lock();
        loop {
            if state.interrupted {
                return None;
            }
            if let Some(line) = state.lines.pop_front() {
                return Some(line);
            }
            state = self
                .ready
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Wakes every blocked [`take`](Self::take), discards pending lines and
    /// refuses further pushes.
    pub fn interrupt(&self) {
        let mut state = self.lock();
        state.interrupted = true;
        state.lines.clear();
        drop(state);
        self.ready.notify_all();
    }

    /// Whether [`interrupt`](Self::interrupt) has been called.
    #[must_use]
    pub fn is_interrupted(&self) -> bool {
        self.lock().interrupted
    }

    /// Number of lines waiting to be taken.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().lines.len()
    }

    /// Whether no lines are waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().lines.is_empty()
    }

    // Every critical section is a single container operation, so a panic
    // elsewhere cannot leave the state half-updated.
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
