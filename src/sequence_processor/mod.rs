pub mod core;
pub mod readers;
pub mod writers;

pub use core::ProcessingStats;
