//! Four-dimensional resource vectors.

use std::ops::{Add, AddAssign, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// Number of modeled resource dimensions.
pub const RESOURCE_COUNT: usize = 4;

/// Resource names in the canonical component order.
pub const RESOURCE_NAMES: [&str; RESOURCE_COUNT] = ["cpu", "mem", "net", "disk"];

/// Amounts of CPU, memory, network bandwidth and disk, either as a host
/// capacity or as a VM demand.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceVector {
    pub cpu: f64,
    pub mem: f64,
    pub net: f64,
    pub disk: f64,
}

impl ResourceVector {
    pub fn new(cpu: f64, mem: f64, net: f64, disk: f64) -> Self {
        Self { cpu, mem, net, disk }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    /// Components in the canonical order (see [RESOURCE_NAMES]).
    pub fn as_array(&self) -> [f64; RESOURCE_COUNT] {
        [self.cpu, self.mem, self.net, self.disk]
    }

    pub fn from_array(components: [f64; RESOURCE_COUNT]) -> Self {
        Self::new(components[0], components[1], components[2], components[3])
    }

    /// Checks that every component fits within the corresponding component of
    /// `other` (the feasibility test).
    pub fn fits_within(&self, other: &Self) -> bool {
        self.cpu <= other.cpu && self.mem <= other.mem && self.net <= other.net && self.disk <= other.disk
    }

    /// Component-wise division. The divisor components must be non-zero.
    pub fn div(&self, other: &Self) -> Self {
        Self::new(
            self.cpu / other.cpu,
            self.mem / other.mem,
            self.net / other.net,
            self.disk / other.disk,
        )
    }

    /// Component-wise maximum of two vectors.
    pub fn component_max(&self, other: &Self) -> Self {
        Self::new(
            self.cpu.max(other.cpu),
            self.mem.max(other.mem),
            self.net.max(other.net),
            self.disk.max(other.disk),
        )
    }

    pub fn max_component(&self) -> f64 {
        self.cpu.max(self.mem).max(self.net).max(self.disk)
    }

    pub fn avg_component(&self) -> f64 {
        (self.cpu + self.mem + self.net + self.disk) / RESOURCE_COUNT as f64
    }

    pub fn is_strictly_positive(&self) -> bool {
        self.cpu > 0. && self.mem > 0. && self.net > 0. && self.disk > 0.
    }
}

impl Add for ResourceVector {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(
            self.cpu + rhs.cpu,
            self.mem + rhs.mem,
            self.net + rhs.net,
            self.disk + rhs.disk,
        )
    }
}

impl AddAssign for ResourceVector {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for ResourceVector {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(
            self.cpu - rhs.cpu,
            self.mem - rhs.mem,
            self.net - rhs.net,
            self.disk - rhs.disk,
        )
    }
}

impl SubAssign for ResourceVector {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}
