//! Queue entries of the scheduler

use crate::core::time::Instant;
use crate::core::types::{EntityId, Sequence};

/// A due resumption of one entity
///
/// Ordered by timestamp, then by sequence number, so simultaneous
/// resumptions run in the order they were enqueued.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct PendingResumption {
    pub at: Instant,
    pub seq: Sequence,
    pub entity: EntityId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cmp::Reverse;
    use std::collections::BinaryHeap;

    fn at(secs: f64) -> Instant {
        Instant::from_secs(secs).unwrap()
    }

    #[test]
    fn test_orders_by_time_then_sequence() {
        let mut heap = BinaryHeap::new();
        heap.push(Reverse(PendingResumption { at: at(5.0), seq: 0, entity: EntityId(0) }));
        heap.push(Reverse(PendingResumption { at: at(1.0), seq: 3, entity: EntityId(1) }));
        heap.push(Reverse(PendingResumption { at: at(1.0), seq: 2, entity: EntityId(2) }));

        let order: Vec<EntityId> = std::iter::from_fn(|| heap.pop().map(|Reverse(r)| r.entity)).collect();
        assert_eq!(order, vec![EntityId(2), EntityId(1), EntityId(0)]);
    }
}
