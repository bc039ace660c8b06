#[allow(clippy::module_inception)]
mod config;

pub use config::{AdapterConfig, Config, GroupingConfig, SummaryConfig};
