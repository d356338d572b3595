//! Background Tasks
//!
//! Long-running maintenance tasks spawned at startup.

pub mod sweep;

pub use sweep::spawn_sweep_task;
