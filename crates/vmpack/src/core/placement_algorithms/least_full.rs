//! Least Full algorithm.

use crate::core::common::{Allocation, AllocationVerdict};
use crate::core::placement_algorithm::HostSelector;
use crate::core::resource_pool::ResourcePoolState;

/// Among the feasible hosts, picks the one with the lowest average
/// utilization over the four resources. Ties go to the lowest host id.
#[derive(Clone, Default)]
pub struct LeastFull;

impl LeastFull {
    pub fn new() -> Self {
        Default::default()
    }
}

impl HostSelector for LeastFull {
    fn select_host(&mut self, alloc: &Allocation, pool: &ResourcePoolState) -> Option<u32> {
        let mut result: Option<u32> = None;
        let mut best_load = f64::MAX;
        for host in pool.get_hosts_list() {
            if pool.can_allocate(alloc, host) == AllocationVerdict::Success {
                let load = pool.average_load(host);
                if load < best_load {
                    best_load = load;
                    result = Some(host);
                }
            }
        }
        result
    }
}
