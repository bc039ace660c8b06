pub mod adapters;
pub mod clustering;
pub mod counts;
pub mod tag_counts;

pub use adapters::{extract_umi, AdapterLayout, ExtractedPair, Extraction, ExtractionStats, MissingAdapter};
pub use clustering::{prepare_umi_groups, GroupingParams, UmiGroup};
pub use counts::{read_umi_counts, UmiCounts};
pub use tag_counts::{TagCount, TagCounter, TagKey};
