//! Cancellable, time-ordered task queue.
//!
//! Provides [`Scheduler`], which defers work by a delay in milliseconds and
//! hands it back through [`Scheduler::pop_due`] once the delay has passed.
//! Delivery is pull-based and single-threaded: the host calls `pop_due`
//! (usually through [`AnimationEngine::service`](crate::AnimationEngine::service))
//! from one loop, so at most one task runs at a time.
//!
//! Every task belongs to a cancellation group identified by a
//! [`CancelToken`]. Cancelling a token drops all of its not-yet-delivered
//! tasks at once.

use crate::time::{TimeDuration, TimeInstant, TimeSource};
use std::collections::BTreeMap;

/// Handle for a group of scheduled tasks that are cancelled together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CancelToken(u64);

impl CancelToken {
    /// Raw group id, unique per scheduler.
    pub fn id(&self) -> u64 {
        self.0
    }
}

struct Pending<T> {
    token: CancelToken,
    task: T,
}

/// Time-ordered queue of deferred tasks.
///
/// Tasks are keyed by fire time in whole milliseconds since the scheduler
/// was created, with submission order breaking ties, so delivery order is
/// non-decreasing in fire time and stable.
///
/// # Type Parameters
/// * `'t` - Lifetime of the time source reference
/// * `C` - Time source implementation type
/// * `T` - Task payload handed back on delivery
pub struct Scheduler<'t, C: TimeSource, T> {
    clock: &'t C,
    epoch: C::Instant,
    queue: BTreeMap<(u64, u64), Pending<T>>,
    next_seq: u64,
    next_token: u64,
}

impl<'t, C: TimeSource, T> Scheduler<'t, C, T> {
    /// Creates an empty scheduler. "Now" at this moment is time zero.
    pub fn new(clock: &'t C) -> Self {
        Self {
            clock,
            epoch: clock.now(),
            queue: BTreeMap::new(),
            next_seq: 0,
            next_token: 0,
        }
    }

    /// Milliseconds elapsed since the scheduler was created.
    pub fn now_ms(&self) -> u64 {
        self.clock.now().duration_since(self.epoch).as_millis()
    }

    /// Allocates a new, empty cancellation group.
    pub fn token(&mut self) -> CancelToken {
        let token = CancelToken(self.next_token);
        self.next_token += 1;
        token
    }

    /// Schedules `task` to be delivered no earlier than `delay_ms` from now,
    /// in a group of its own.
    pub fn after(&mut self, delay_ms: u64, task: T) -> CancelToken {
        let token = self.token();
        self.after_in(token, delay_ms, task);
        token
    }

    /// Schedules `task` as part of an existing group.
    pub fn after_in(&mut self, token: CancelToken, delay_ms: u64, task: T) {
        let fire_at = self.now_ms().saturating_add(delay_ms);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.insert((fire_at, seq), Pending { token, task });
    }

    /// Drops every pending task in the group.
    ///
    /// Returns how many tasks were dropped. Cancelling a token whose tasks
    /// already fired, or were already cancelled, drops nothing.
    pub fn cancel(&mut self, token: CancelToken) -> usize {
        let before = self.queue.len();
        self.queue.retain(|_, pending| pending.token != token);
        before - self.queue.len()
    }

    /// Drops every pending task.
    pub fn cancel_all(&mut self) -> usize {
        let dropped = self.queue.len();
        self.queue.clear();
        dropped
    }

    /// Removes and returns the earliest task whose fire time has passed.
    pub fn pop_due(&mut self) -> Option<T> {
        let now = self.now_ms();
        let entry = self.queue.first_entry()?;
        if entry.key().0 > now {
            return None;
        }
        Some(entry.remove().task)
    }

    /// Time until the earliest pending task is due.
    ///
    /// # Returns
    /// * `Some(Duration::ZERO)` - a task is already due
    /// * `Some(duration)` - sleep this long before delivering again
    /// * `None` - nothing is pending
    pub fn next_due_in(&self) -> Option<<C::Instant as TimeInstant>::Duration> {
        let (&(fire_at, _), _) = self.queue.first_key_value()?;
        let wait = fire_at.saturating_sub(self.now_ms());
        Some(<<C::Instant as TimeInstant>::Duration as TimeDuration>::from_millis(wait))
    }

    /// Number of pending tasks.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of pending tasks in one group.
    pub fn pending_in(&self, token: CancelToken) -> usize {
        self.queue.values().filter(|pending| pending.token == token).count()
    }

    /// Pending tasks in delivery order as `(fire time in ms, group, task)`.
    pub fn iter(&self) -> impl Iterator<Item = (u64, CancelToken, &T)> + '_ {
        self.queue
            .iter()
            .map(|(&(fire_at, _), pending)| (fire_at, pending.token, &pending.task))
    }
}
