pub mod extract;
pub mod group;
pub mod prepare;
pub mod summarize;
