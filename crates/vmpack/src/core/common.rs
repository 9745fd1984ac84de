use serde::Serialize;

use crate::core::resources::ResourceVector;

/// A VM allocation request: the VM id and its resource demand.
#[derive(Serialize, Clone, Copy, Debug)]
pub struct Allocation {
    pub id: u32,
    pub demand: ResourceVector,
}

#[derive(PartialEq, Debug)]
pub enum AllocationVerdict {
    NotEnoughCpu,
    NotEnoughMemory,
    NotEnoughNetwork,
    NotEnoughDisk,
    Success,
    HostNotFound,
}
