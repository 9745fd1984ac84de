//! Migration accounting between successive placements.

use crate::core::assignment::PlacementAssignment;

/// Compares successive assignments produced by one algorithm and counts
/// how many VMs changed hosts.
///
/// Only host-to-host moves count: a VM that appears for the first time, or
/// that was placed before and is unplaced now, is not a migration.
#[derive(Default)]
pub struct MigrationTracker {
    prev: Option<PlacementAssignment>,
}

impl MigrationTracker {
    pub fn new() -> Self {
        Self { prev: None }
    }

    /// Records the next assignment and returns the number of migrations
    /// relative to the previously recorded one.
    pub fn record(&mut self, next: &PlacementAssignment) -> u32 {
        let migrations = match &self.prev {
            Some(prev) => next
                .iter()
                .filter(|(vm, host)| matches!(prev.host_of(*vm), Some(old) if old != *host))
                .count() as u32,
            None => 0,
        };
        self.prev = Some(next.clone());
        migrations
    }
}
