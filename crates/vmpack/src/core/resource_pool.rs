//! Resource pool state.

use std::collections::BTreeMap;

use crate::core::common::{Allocation, AllocationVerdict};
use crate::core::resources::ResourceVector;
use crate::core::scenario::Scenario;

/// Stores host properties (resource capacity) and state (remaining resources,
/// current allocations).
#[derive(Clone)]
pub struct HostInfo {
    pub capacity: ResourceVector,
    pub remaining: ResourceVector,
    pub allocations: BTreeMap<u32, Allocation>,
}

impl HostInfo {
    /// Creates host info with all capacity available.
    pub fn new(capacity: ResourceVector) -> Self {
        Self {
            capacity,
            remaining: capacity,
            allocations: BTreeMap::new(),
        }
    }
}

/// Mutable state of all hosts during one algorithm run.
///
/// A pool is always built fresh from the scenario at the start of a run, so
/// no allocations leak between runs of different algorithms or sizes.
#[derive(Clone)]
pub struct ResourcePoolState {
    hosts: BTreeMap<u32, HostInfo>,
}

impl ResourcePoolState {
    /// Creates empty resource pool state.
    pub fn new() -> Self {
        Self { hosts: BTreeMap::new() }
    }

    /// Creates pool state with one fully available host per scenario capacity,
    /// with host ids equal to scenario indices.
    pub fn from_scenario(scenario: &Scenario) -> Self {
        let mut pool = Self::new();
        for (id, &capacity) in scenario.hosts.iter().enumerate() {
            pool.add_host(id as u32, capacity);
        }
        pool
    }

    /// Adds host to resource pool.
    pub fn add_host(&mut self, id: u32, capacity: ResourceVector) {
        self.hosts.insert(id, HostInfo::new(capacity));
    }

    /// Returns IDs of all hosts in ascending order.
    pub fn get_hosts_list(&self) -> Vec<u32> {
        self.hosts.keys().cloned().collect()
    }

    /// Returns the number of hosts.
    pub fn host_count(&self) -> usize {
        self.hosts.len()
    }

    /// Checks if the specified allocation is currently possible on the
    /// specified host.
    pub fn can_allocate(&self, alloc: &Allocation, host_id: u32) -> AllocationVerdict {
        let host = match self.hosts.get(&host_id) {
            Some(host) => host,
            None => return AllocationVerdict::HostNotFound,
        };
        if host.remaining.cpu < alloc.demand.cpu {
            return AllocationVerdict::NotEnoughCpu;
        }
        if host.remaining.mem < alloc.demand.mem {
            return AllocationVerdict::NotEnoughMemory;
        }
        if host.remaining.net < alloc.demand.net {
            return AllocationVerdict::NotEnoughNetwork;
        }
        if host.remaining.disk < alloc.demand.disk {
            return AllocationVerdict::NotEnoughDisk;
        }
        AllocationVerdict::Success
    }

    /// Applies the specified allocation on the specified host.
    /// The caller must have checked feasibility via [Self::can_allocate].
    pub fn allocate(&mut self, alloc: &Allocation, host_id: u32) {
        if let Some(host) = self.hosts.get_mut(&host_id) {
            if host.allocations.contains_key(&alloc.id) {
                return;
            }
            debug_assert!(alloc.demand.fits_within(&host.remaining));
            host.remaining -= alloc.demand;
            host.allocations.insert(alloc.id, *alloc);
        }
    }

    /// Removes the specified allocation from the specified host.
    pub fn release(&mut self, alloc_id: u32, host_id: u32) {
        if let Some(host) = self.hosts.get_mut(&host_id) {
            if let Some(alloc) = host.allocations.remove(&alloc_id) {
                host.remaining += alloc.demand;
            }
        }
    }

    /// Returns the total capacity of the specified host.
    pub fn capacity(&self, host_id: u32) -> ResourceVector {
        self.hosts[&host_id].capacity
    }

    /// Returns the remaining resources of the specified host.
    pub fn remaining(&self, host_id: u32) -> ResourceVector {
        self.hosts[&host_id].remaining
    }

    /// Returns the resources of the specified host currently in use.
    pub fn used(&self, host_id: u32) -> ResourceVector {
        let host = &self.hosts[&host_id];
        host.capacity - host.remaining
    }

    /// Returns per-resource utilization (used over capacity) of the host.
    pub fn utilization(&self, host_id: u32) -> ResourceVector {
        self.used(host_id).div(&self.capacity(host_id))
    }

    /// Returns host utilization averaged over the four resources.
    pub fn average_load(&self, host_id: u32) -> f64 {
        self.utilization(host_id).avg_component()
    }

    /// Returns, per resource, the maximum remaining capacity across all hosts.
    pub fn max_remaining(&self) -> ResourceVector {
        self.hosts
            .values()
            .fold(ResourceVector::zero(), |acc, host| acc.component_max(&host.remaining))
    }

    /// Returns, per resource, the remaining fraction of capacity averaged
    /// over all hosts.
    pub fn avg_remaining_fraction(&self) -> ResourceVector {
        let mut sum = ResourceVector::zero();
        for host in self.hosts.values() {
            sum += host.remaining.div(&host.capacity);
        }
        let n = self.hosts.len() as f64;
        ResourceVector::new(sum.cpu / n, sum.mem / n, sum.net / n, sum.disk / n)
    }

    /// Returns, per resource, the used capacity averaged over all hosts.
    pub fn avg_used(&self) -> ResourceVector {
        let mut sum = ResourceVector::zero();
        for host in self.hosts.values() {
            sum += host.capacity - host.remaining;
        }
        let n = self.hosts.len() as f64;
        ResourceVector::new(sum.cpu / n, sum.mem / n, sum.net / n, sum.disk / n)
    }

    /// Returns the summed capacity of all hosts.
    pub fn total_capacity(&self) -> ResourceVector {
        self.hosts
            .values()
            .fold(ResourceVector::zero(), |acc, host| acc + host.capacity)
    }

    /// Returns the summed used resources of all hosts.
    pub fn total_used(&self) -> ResourceVector {
        self.hosts
            .values()
            .fold(ResourceVector::zero(), |acc, host| acc + (host.capacity - host.remaining))
    }
}

impl Default for ResourcePoolState {
    fn default() -> Self {
        Self::new()
    }
}
