//! Random feasible host selection.

use rand::prelude::*;
use rand::rngs::StdRng;

use crate::core::common::{Allocation, AllocationVerdict};
use crate::core::placement_algorithm::HostSelector;
use crate::core::resource_pool::ResourcePoolState;

/// Picks a host uniformly at random among those with enough resources.
///
/// Cloning resets the generator to the seed, so every run of the driver
/// starts from the same stream and stays reproducible.
pub struct RandomHost {
    seed: u64,
    rng: StdRng,
}

impl RandomHost {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Clone for RandomHost {
    fn clone(&self) -> Self {
        Self::new(self.seed)
    }
}

impl HostSelector for RandomHost {
    fn select_host(&mut self, alloc: &Allocation, pool: &ResourcePoolState) -> Option<u32> {
        let feasible: Vec<u32> = pool
            .get_hosts_list()
            .into_iter()
            .filter(|&host| pool.can_allocate(alloc, host) == AllocationVerdict::Success)
            .collect();
        feasible.choose(&mut self.rng).copied()
    }
}
