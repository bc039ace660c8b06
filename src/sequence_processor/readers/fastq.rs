use crate::error::{Mate, UmiPrepError};
use anyhow::{anyhow, Context, Result};
use bio::io::fastq::{self, Record};
use niffler::get_reader;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

const BUFFER_SIZE: usize = 16 * 1024 * 1024;

/// FASTQ reader over plain, gzip or bzip2 input, detected from the leading bytes.
pub struct FastqReader {
    reader: fastq::Reader<BufReader<Box<dyn Read>>>,
}

impl FastqReader {
    pub fn new(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open FASTQ {}", path.display()))?;
        Self::from_reader(Box::new(file))
            .with_context(|| format!("Failed to detect compression of {}", path.display()))
    }

    pub fn from_reader(reader: Box<dyn Read>) -> Result<Self> {
        let (inner_reader, _compression) = get_reader(reader)?;
        Ok(Self {
            reader: fastq::Reader::with_capacity(BUFFER_SIZE, inner_reader),
        })
    }

    pub fn records(self) -> fastq::Records<BufReader<Box<dyn Read>>> {
        self.reader.records()
    }
}

/// Walks two mate streams in lockstep.
///
/// Unlike a plain `zip`, a stream that ends while its mate still has records
/// is reported as [`UmiPrepError::UnequalPairs`] instead of truncating silently.
/// Records are checked for matching sequence and quality lengths.
pub struct PairedReads<B: BufRead> {
    read1: fastq::Records<B>,
    read2: fastq::Records<B>,
    pairs: u64,
    finished: bool,
}

impl PairedReads<BufReader<Box<dyn Read>>> {
    pub fn open(fastq1: &Path, fastq2: &Path) -> Result<Self> {
        Ok(Self::new(
            FastqReader::new(fastq1)?.records(),
            FastqReader::new(fastq2)?.records(),
        ))
    }
}

impl<B: BufRead> PairedReads<B> {
    pub fn new(read1: fastq::Records<B>, read2: fastq::Records<B>) -> Self {
        Self {
            read1,
            read2,
            pairs: 0,
            finished: false,
        }
    }

    /// Pairs yielded so far.
    pub fn pairs(&self) -> u64 {
        self.pairs
    }

    fn checked(record: std::result::Result<Record, fastq::Error>, mate: Mate) -> Result<Record> {
        let record = record.with_context(|| format!("Failed to parse {} FASTQ record", mate))?;
        record
            .check()
            .map_err(|e| anyhow!("Invalid {} record '{}': {}", mate, record.id(), e))?;
        Ok(record)
    }

    fn fail(&mut self, error: anyhow::Error) -> Option<Result<(Record, Record)>> {
        self.finished = true;
        Some(Err(error))
    }
}

impl<B: BufRead> Iterator for PairedReads<B> {
    type Item = Result<(Record, Record)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match (self.read1.next(), self.read2.next()) {
            (None, None) => {
                self.finished = true;
                None
            }
            (Some(r1), Some(r2)) => {
                let pair = Self::checked(r1, Mate::Read1)
                    .and_then(|r1| Ok((r1, Self::checked(r2, Mate::Read2)?)));
                match pair {
                    Ok(pair) => {
                        self.pairs += 1;
                        Some(Ok(pair))
                    }
                    Err(e) => self.fail(e),
                }
            }
            (None, Some(_)) => {
                let pairs = self.pairs;
                self.fail(UmiPrepError::UnequalPairs { ended: Mate::Read1, pairs }.into())
            }
            (Some(_), None) => {
                let pairs = self.pairs;
                self.fail(UmiPrepError::UnequalPairs { ended: Mate::Read2, pairs }.into())
            }
        }
    }
}
