use crate::config::{Config, SummaryConfig};
use crate::sequence_processor::readers::BamReader;
use crate::sequence_processor::ProcessingStats;
use crate::umi::tag_counts::sample_name;
use crate::umi::TagCounter;
use crate::utils::progress_bar_builder::record_spinner;
use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
struct TopUmiRow<'a> {
    sample: &'a str,
    umi: &'a str,
    position: i64,
    count: u64,
}

/// Tallies (reference, position, UMI) over the mapped, tagged records of one file.
pub fn count_umi_tags(
    path: &Path,
    tags: &[String],
    reference: Option<&str>,
) -> Result<(TagCounter, ProcessingStats)> {
    let mut reader = BamReader::new(path, reference)?;
    let progress = record_spinner(format!("Counting UMI tags in {}", path.display()))?;
    let mut counter = TagCounter::new();

    let stats = reader.for_each_tagged(tags, &progress, |aln| {
        counter.observe(aln.reference, aln.position, &aln.umi)
    })?;

    progress.finish_with_message(format!(
        "Counted {} tagged records at {} distinct positions",
        stats.accepted,
        counter.len()
    ));
    log::debug!(
        "{}: {} records, {} unmapped, {} without {}",
        path.display(),
        stats.processed,
        stats.skipped,
        stats.untagged,
        tags.join("/")
    );
    Ok((counter, stats))
}

/// Appends the `top_n` most frequent triples of one file under `sample`.
pub fn write_top_counts<W: Write>(
    writer: &mut csv::Writer<W>,
    sample: &str,
    counter: TagCounter,
    top_n: usize,
) -> Result<usize> {
    let top = counter.top(top_n);
    for entry in &top {
        writer.serialize(TopUmiRow {
            sample,
            umi: &entry.key.umi,
            position: entry.key.position,
            count: entry.count,
        })?;
    }
    Ok(top.len())
}

/// Writes one shared table covering every input file, in argument order.
pub fn summarize_files(
    inputs: &[PathBuf],
    output: &Path,
    summary: &SummaryConfig,
    reference: Option<&str>,
) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    writer.write_record(["sample", "umi", "position", "count"])?;

    for input in inputs {
        let (counter, _stats) = count_umi_tags(input, &summary.umi_tags, reference)?;
        let base_name = input
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| input.display().to_string());
        println!("{}", base_name);

        let sample = sample_name(&base_name, &summary.sample_suffix);
        write_top_counts(&mut writer, &sample, counter, summary.top_n)?;
    }

    writer.flush()?;
    Ok(())
}

pub fn run(
    bam_files: Vec<String>,
    output_file: Option<String>,
    reference_file: Option<String>,
    config: &Config,
) -> Result<()> {
    if bam_files.is_empty() {
        anyhow::bail!("No alignment files given");
    }
    let inputs: Vec<PathBuf> = bam_files.iter().map(PathBuf::from).collect();
    let output = PathBuf::from(output_file.unwrap_or_else(|| config.summary.output.clone()));

    summarize_files(&inputs, &output, &config.summary, reference_file.as_deref())?;
    log::info!("Wrote top UMI counts to {}", output.display());
    Ok(())
}
