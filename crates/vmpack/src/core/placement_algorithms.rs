//! Implementations of placement algorithms.

pub mod drf;
pub mod first_fit;
pub mod ilp;
pub mod least_full;
pub mod lp_rounding;
pub mod most_full;
pub mod random;
