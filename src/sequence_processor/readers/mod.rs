mod bam;
mod fastq;

pub use bam::{umi_tag, BamReader, TaggedAlignment};
pub use fastq::{FastqReader, PairedReads};
