use anyhow::{Context, Result};
use bio::io::fastq::{self, Record};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Plain-text FASTQ output file.
pub struct FastqSink {
    writer: fastq::Writer<File>,
    path: PathBuf,
    written: u64,
}

impl FastqSink {
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        Ok(Self {
            writer: fastq::Writer::new(file),
            path: path.to_path_buf(),
            written: 0,
        })
    }

    pub fn write(&mut self, record: &Record) -> Result<()> {
        self.writer
            .write_record(record)
            .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        self.written += 1;
        Ok(())
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    /// Flushes and returns the path written.
    pub fn finish(mut self) -> Result<PathBuf> {
        self.writer
            .flush()
            .with_context(|| format!("Failed to flush {}", self.path.display()))?;
        Ok(self.path)
    }
}
