//! Scheduler / timeline clock
//!
//! Owns simulated time and the queue of pending resumptions. Time only moves
//! by jumping to the next popped resumption, never by a fixed tick.

pub mod queue;

use ahash::AHashMap;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::core::time::Instant;
use crate::core::types::{EntityId, Sequence};

pub use queue::PendingResumption;

/// Discrete-event clock with a deterministic resumption queue
///
/// Each entity has at most one live entry. Rescheduling or cancelling an
/// entity leaves its old heap entry in place; `pop` recognises and skips it
/// because its sequence number no longer matches the live one.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    now: Instant,
    next_seq: Sequence,
    queue: BinaryHeap<Reverse<PendingResumption>>,
    live: AHashMap<EntityId, Sequence>,
    steps: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current simulated time
    pub fn now(&self) -> Instant {
        self.now
    }

    /// Number of resumptions popped so far
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Number of live resumptions
    pub fn pending(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Enqueue a resumption for `entity` at `at`, replacing any live one
    ///
    /// Times in the past are clamped to `now`.
    pub fn schedule(&mut self, entity: EntityId, at: Instant) -> Sequence {
        debug_assert!(at >= self.now, "Resumption scheduled in the past");
        let at = at.max(self.now);

        let seq = self.next_seq;
        self.next_seq += 1;

        self.live.insert(entity, seq);
        self.queue.push(Reverse(PendingResumption { at, seq, entity }));
        tracing::trace!(entity = %entity, at = %at, seq, "Resumption scheduled");

        seq
    }

    /// Drop the live resumption of `entity`, if any
    pub fn cancel(&mut self, entity: EntityId) -> bool {
        self.live.remove(&entity).is_some()
    }

    /// Pop the earliest live resumption and move the clock to it
    pub fn pop(&mut self) -> Option<PendingResumption> {
        self.discard_stale();
        let Reverse(next) = self.queue.pop()?;

        debug_assert!(next.at >= self.now, "Time went backwards");
        self.live.remove(&next.entity);
        self.now = next.at;
        self.steps += 1;

        Some(next)
    }

    /// Time of the earliest live resumption
    pub fn peek_time(&mut self) -> Option<Instant> {
        self.discard_stale();
        self.queue.peek().map(|Reverse(next)| next.at)
    }

    /// Move the clock forward without popping; ignored if `to` is not later
    /// than now or a live resumption is due before `to`
    pub fn advance_to(&mut self, to: Instant) {
        if to <= self.now {
            return;
        }
        if let Some(due) = self.peek_time() {
            if due < to {
                return;
            }
        }
        self.now = to;
    }

    /// Remove every live resumption, returning their entities in id order
    pub fn drain(&mut self) -> Vec<EntityId> {
        let mut entities: Vec<EntityId> = self.live.drain().map(|(entity, _)| entity).collect();
        entities.sort();
        self.queue.clear();
        entities
    }

    fn discard_stale(&mut self) {
        while let Some(Reverse(top)) = self.queue.peek() {
            if self.live.get(&top.entity) == Some(&top.seq) {
                break;
            }
            self.queue.pop();
        }
    }
}
