use crate::config::Config;
use crate::sequence_processor::readers::PairedReads;
use crate::sequence_processor::writers::FastqSink;
use crate::umi::{extract_umi, AdapterLayout, Extraction, ExtractionStats, UmiCounts};
use crate::utils::external_tools::{bgzip_and_index, check_tool};
use crate::utils::progress_bar_builder::{record_spinner, PROGRESS_INTERVAL};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Files produced for one flowcell/sample name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOutputs {
    pub fastq1: PathBuf,
    pub fastq2: PathBuf,
    pub umi_counts: PathBuf,
}

impl ExtractOutputs {
    pub fn new(out_dir: &Path, name: &str) -> Self {
        Self {
            fastq1: out_dir.join(format!("{}_R1.fq", name)),
            fastq2: out_dir.join(format!("{}_R2.fq", name)),
            umi_counts: out_dir.join(format!("{}-umicounts.csv", name)),
        }
    }
}

#[derive(Debug)]
pub struct ExtractSummary {
    pub stats: ExtractionStats,
    pub counts: UmiCounts,
}

/// Streams both mates, writing accepted pairs as plain FASTQ and counting UMIs.
pub fn extract_pairs(
    fastq1: &Path,
    fastq2: &Path,
    outputs: &ExtractOutputs,
    layout: &AdapterLayout,
) -> Result<ExtractSummary> {
    let progress = record_spinner(format!("Extracting UMIs from {}", fastq1.display()))?;
    let mut out1 = FastqSink::create(&outputs.fastq1)?;
    let mut out2 = FastqSink::create(&outputs.fastq2)?;
    let mut stats = ExtractionStats::default();
    let mut counts = UmiCounts::new();

    let mut paired = PairedReads::open(fastq1, fastq2)?;
    for pair in paired.by_ref() {
        let (read1, read2) = pair?;
        let outcome = extract_umi(&read1, &read2, layout);
        stats.record(&outcome);

        if let Extraction::Accepted(extracted) = outcome {
            out1.write(&extracted.read1)?;
            out2.write(&extracted.read2)?;
            counts.add(&extracted.umi);
        }

        if stats.pairs % PROGRESS_INTERVAL == 0 {
            progress.set_position(stats.pairs);
        }
    }

    out1.finish()?;
    out2.finish()?;
    log::debug!("Read {} pairs from {}", paired.pairs(), fastq1.display());
    progress.finish_with_message(format!(
        "Kept {} of {} pairs with {} distinct UMIs",
        stats.accepted,
        stats.pairs,
        counts.len()
    ));
    log_rejections(&stats);

    Ok(ExtractSummary { stats, counts })
}

fn log_rejections(stats: &ExtractionStats) {
    log::info!(
        "Extracted {} of {} read pairs ({} rejected)",
        stats.accepted,
        stats.pairs,
        stats.rejected()
    );
    if stats.rejected() > 0 {
        log::info!(
            "Rejected: read 1 adapter missing {}, read 2 leading adapter missing {}, \
             read 2 trailing adapter missing {}, adapters out of order {}, wrong UMI length {}",
            stats.missing_read1_adapter,
            stats.missing_read2_leading_adapter,
            stats.missing_read2_trailing_adapter,
            stats.wrong_order,
            stats.bad_umi_length
        );
    }
}

/// Writes the counts table and echoes the most abundant UMIs.
pub fn report_counts(counts: &UmiCounts, path: &Path, report_top: usize) -> Result<()> {
    for (umi, count) in counts.sorted().into_iter().take(report_top) {
        println!("{} {}", umi, count);
    }
    counts.write_csv(path)
}

/// Full extraction for one pair of inputs: pass, compression, indexing, counts.
///
/// The counts table is written last; its presence marks a finished sample.
pub fn extract_sample(
    fastq1: &Path,
    fastq2: &Path,
    out_dir: &Path,
    name: &str,
    layout: &AdapterLayout,
    config: &Config,
) -> Result<ExtractOutputs> {
    check_tool("bgzip")?;
    check_tool("grabix")?;

    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory {}", out_dir.display()))?;
    let outputs = ExtractOutputs::new(out_dir, name);
    let summary = extract_pairs(fastq1, fastq2, &outputs, layout)?;

    bgzip_and_index(&outputs.fastq1, false)?;
    bgzip_and_index(&outputs.fastq2, false)?;

    report_counts(&summary.counts, &outputs.umi_counts, config.report_top)?;
    Ok(outputs)
}

pub fn run(
    out_dir: String,
    name: String,
    fastq1: String,
    fastq2: String,
    read1_tag: Option<usize>,
    read2_tag: Option<usize>,
    config: &Config,
) -> Result<()> {
    let default_tag = config.adapters.default_tag_length;
    let layout = AdapterLayout::from_config(
        &config.adapters,
        read1_tag.unwrap_or(default_tag),
        read2_tag.unwrap_or(default_tag),
    );

    extract_sample(
        Path::new(&fastq1),
        Path::new(&fastq2),
        Path::new(&out_dir),
        &name,
        &layout,
        config,
    )?;
    Ok(())
}
