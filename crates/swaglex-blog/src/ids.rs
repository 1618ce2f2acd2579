use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

/// Source of identifiers for newly created records.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// Strictly increasing numeric ids.
///
/// Seeded from the wall clock in milliseconds so ids look like the timestamp
/// ids older clients expect, but two creates in the same millisecond still
/// get distinct values.
#[derive(Debug)]
pub struct MonotonicIds {
    next: AtomicU64,
}

impl MonotonicIds {
    pub fn new() -> Self {
        Self::starting_at(Utc::now().timestamp_millis().max(0) as u64)
    }

    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }
}

impl Default for MonotonicIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for MonotonicIds {
    fn next_id(&self) -> String {
        self.next.fetch_add(1, Ordering::Relaxed).to_string()
    }
}
