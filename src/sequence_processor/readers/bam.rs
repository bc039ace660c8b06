use crate::sequence_processor::core::ProcessingStats;
use crate::utils::progress_bar_builder::PROGRESS_INTERVAL;
use anyhow::{Context, Result};
use indicatif::ProgressBar;
use rust_htslib::bam::{self, record::Aux, Read};
use std::path::Path;

/// A mapped record that carries a UMI tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedAlignment<'a> {
    pub reference: &'a str,
    /// 0-based leftmost mapping position.
    pub position: i64,
    pub umi: String,
}

/// SAM/BAM/CRAM reader yielding only mapped, UMI-tagged records.
pub struct BamReader {
    reader: bam::Reader,
    reference_names: Vec<String>,
}

impl BamReader {
    pub fn new(path: &Path, reference: Option<&str>) -> Result<Self> {
        let mut reader = bam::Reader::from_path(path)
            .with_context(|| format!("Failed to open alignments {}", path.display()))?;

        if path.extension().map_or(false, |ext| ext == "cram") {
            if let Some(ref_path) = reference {
                reader.set_reference(ref_path)?;
            }
        }

        let reference_names = reader
            .header()
            .target_names()
            .iter()
            .map(|name| String::from_utf8_lossy(name).into_owned())
            .collect();

        Ok(Self {
            reader,
            reference_names,
        })
    }

    /// Feeds every mapped record that has one of `tags` to `visit`.
    ///
    /// Unmapped records count as skipped, mapped ones without a tag as untagged.
    pub fn for_each_tagged<F>(
        &mut self,
        tags: &[String],
        progress: &ProgressBar,
        mut visit: F,
    ) -> Result<ProcessingStats>
    where
        F: FnMut(TaggedAlignment<'_>),
    {
        let mut stats = ProcessingStats::default();
        let mut record = bam::Record::new();

        while let Some(result) = self.reader.read(&mut record) {
            result.context("Failed to read alignment record")?;
            stats.processed += 1;

            if stats.processed % PROGRESS_INTERVAL == 0 {
                progress.set_position(stats.processed);
            }

            if record.is_unmapped() || record.tid() < 0 {
                stats.skipped += 1;
                continue;
            }

            let Some(umi) = umi_tag(&record, tags) else {
                stats.untagged += 1;
                continue;
            };

            let reference = &self.reference_names[record.tid() as usize];
            visit(TaggedAlignment {
                reference,
                position: record.pos(),
                umi,
            });
            stats.accepted += 1;
        }

        progress.set_position(stats.processed);
        Ok(stats)
    }
}

/// Value of the first tag in `tags` present on the record.
///
/// An empty value leaves the record untagged; later tags are not consulted.
pub fn umi_tag(record: &bam::Record, tags: &[String]) -> Option<String> {
    tags.iter()
        .find_map(|tag| match record.aux(tag.as_bytes()) {
            Ok(Aux::String(value)) | Ok(Aux::HexByteArray(value)) => Some(value.to_string()),
            Ok(Aux::Char(value)) => Some((value as char).to_string()),
            _ => None,
        })
        .filter(|umi| !umi.is_empty())
}
