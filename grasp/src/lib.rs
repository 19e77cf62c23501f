//!
//! Optimizer for loading tools into autoclaves, built on top of `curenest`.
//!
//! Tools are distributed over the autoclaves per cure cycle, after which every autoclave is
//! filled independently by a corner-fitting construction with randomized restarts (GRASP),
//! optionally extended onto the raised level carried by its stands.
//!

pub mod config;
pub mod io;
pub mod opt;
pub mod time;

pub use opt::orchestrator::solve;
pub use time::EPOCH;
