//! Work-queue ordering for status-bearing records.
//!
//! Operator queues (contact messages, pending registrations, ...) show
//! unresolved items first. The order comes from an explicit rank per status,
//! never from the alphabetical order of status names.

use chrono::{DateTime, Utc};

/// Explicit priority rank of a status in an operator queue.
///
/// Lower ranks sort first.
pub trait QueueRank {
    fn queue_rank(&self) -> u8;
}

/// Sort `items` by status rank ascending, then newest first within a rank.
pub fn sort_queue<T, S, F, G>(items: &mut [T], status: F, created_at: G)
where
    S: QueueRank,
    F: Fn(&T) -> S,
    G: Fn(&T) -> DateTime<Utc>,
{
    items.sort_by(|a, b| {
        status(a)
            .queue_rank()
            .cmp(&status(b).queue_rank())
            .then_with(|| created_at(b).cmp(&created_at(a)))
    });
}
