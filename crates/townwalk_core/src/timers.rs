use std::time::{Duration, Instant};

use tracing::debug;

#[derive(Debug)]
struct Pending<T> {
    deadline: Instant,
    payload: T,
}

/// Wall-clock deferred work, polled by its owner.
///
/// Nothing runs on its own: the owner calls [`DelayQueue::drain_due`] with the
/// current time and acts on whatever came due. Dropping the queue (or calling
/// [`DelayQueue::clear`]) releases every pending entry without firing it.
#[derive(Debug)]
pub struct DelayQueue<T> {
    pending: Vec<Pending<T>>,
}

impl<T> Default for DelayQueue<T> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
        }
    }
}

impl<T> DelayQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, now: Instant, delay: Duration, payload: T) {
        self.pending.push(Pending {
            deadline: now + delay,
            payload,
        });
    }

    /// Removes and returns every entry whose deadline is at or before `now`,
    /// earliest deadline first. Entries with equal deadlines keep scheduling order.
    pub fn drain_due(&mut self, now: Instant) -> Vec<T> {
        if self.pending.iter().all(|entry| entry.deadline > now) {
            return Vec::new();
        }

        let mut due = Vec::new();
        let mut index = 0;
        while index < self.pending.len() {
            if self.pending[index].deadline <= now {
                due.push(self.pending.remove(index));
            } else {
                index += 1;
            }
        }
        // stable, so ties stay in scheduling order
        due.sort_by_key(|entry| entry.deadline);
        due.into_iter().map(|entry| entry.payload).collect()
    }

    /// Drops all pending entries and reports how many were discarded.
    pub fn clear(&mut self) -> usize {
        let count = self.pending.len();
        if count > 0 {
            debug!("discarding {count} pending timer(s)");
        }
        self.pending.clear();
        count
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.iter().map(|entry| entry.deadline).min()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
