use std::path::PathBuf;
use thiserror::Error;

/// Structural failures that abort a run.
#[derive(Debug, Error)]
pub enum UmiPrepError {
    #[error("paired FASTQ streams out of sync: {ended} ended after {pairs} pairs while its mate still had records")]
    UnequalPairs { ended: Mate, pairs: u64 },

    #[error("invalid index setup value '{0}': expected a leading tag length such as '4N'")]
    InvalidTagSetup(String),

    #[error("unsupported sample sheet {}: export the first sheet to CSV", .0.display())]
    UnsupportedSampleSheet(PathBuf),

    #[error("no FASTQ matched {0}")]
    MissingFastq(String),

    #[error("external tool '{tool}' failed ({status}): {stderr}")]
    ToolFailed {
        tool: String,
        status: String,
        stderr: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mate {
    Read1,
    Read2,
}

impl std::fmt::Display for Mate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mate::Read1 => write!(f, "read 1"),
            Mate::Read2 => write!(f, "read 2"),
        }
    }
}
