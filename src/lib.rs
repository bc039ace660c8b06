pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod sample_sheet;
pub mod sequence_processor;
pub mod umi;
pub mod utils;

pub use error::UmiPrepError;
