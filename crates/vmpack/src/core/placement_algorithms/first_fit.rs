//! First Fit algorithm.

use crate::core::common::{Allocation, AllocationVerdict};
use crate::core::placement_algorithm::HostSelector;
use crate::core::resource_pool::ResourcePoolState;

/// Uses the first host among all active hosts with enough resources to
/// place the VM.
#[derive(Clone, Default)]
pub struct FirstFit;

impl FirstFit {
    pub fn new() -> Self {
        Default::default()
    }
}

impl HostSelector for FirstFit {
    fn select_host(&mut self, alloc: &Allocation, pool: &ResourcePoolState) -> Option<u32> {
        for host in pool.get_hosts_list() {
            if pool.can_allocate(alloc, host) == AllocationVerdict::Success {
                return Some(host);
            }
        }
        None
    }
}
