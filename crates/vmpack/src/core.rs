pub mod assignment;
pub mod common;
pub mod config;
pub mod migration;
pub mod placement_algorithm;
pub mod placement_algorithms;
pub mod resource_pool;
pub mod resources;
pub mod scenario;
pub mod solver;
