mod fastq;

pub use fastq::FastqSink;
