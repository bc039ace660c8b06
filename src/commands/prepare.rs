use crate::commands::extract::{extract_sample, ExtractOutputs};
use crate::commands::group::umi_groups;
use crate::config::Config;
use crate::sample_sheet::{read_sample_sheet, SampleRow};
use crate::sequence_processor::readers::FastqReader;
use crate::sequence_processor::writers::FastqSink;
use crate::umi::{AdapterLayout, GroupingParams, UmiGroup};
use crate::utils::external_tools::{bgzip_and_index, check_tool, grabix_index_path, gz_path};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Extracted, compressed outputs of one sample sheet row.
#[derive(Debug, Clone)]
pub struct PreparedSample {
    pub name: String,
    pub fastq1: PathBuf,
    pub fastq2: PathBuf,
    pub umi_counts: PathBuf,
}

impl PreparedSample {
    fn new(name: String, outputs: ExtractOutputs) -> Self {
        Self {
            name,
            fastq1: gz_path(&outputs.fastq1),
            fastq2: gz_path(&outputs.fastq2),
            umi_counts: outputs.umi_counts,
        }
    }
}

/// File name without its compression and FASTQ extensions.
pub fn fastq_stem(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = [".gz", ".bz2"]
        .iter()
        .find_map(|ext| name.strip_suffix(ext))
        .unwrap_or(name.as_str());
    [".fq", ".fastq"]
        .iter()
        .find_map(|ext| name.strip_suffix(ext))
        .unwrap_or(name)
        .to_string()
}

/// Copies reads whose name carries a UMI of `group` to a plain FASTQ.
pub fn write_umi_group(in_fq: &Path, out_fq: &Path, group: &UmiGroup) -> Result<u64> {
    let mut sink = FastqSink::create(out_fq)?;
    for record in FastqReader::new(in_fq)?.records() {
        let record = record.with_context(|| format!("Failed to parse {}", in_fq.display()))?;
        if group.matches_read_name(record.id()) {
            sink.write(&record)?;
        }
    }
    let written = sink.written();
    sink.finish()?;
    Ok(written)
}

/// Splits one group out of `in_fq` into `split/<stem>_<founder>.fq.gz`, indexed.
pub fn split_umi_group(in_fq: &Path, group: &UmiGroup) -> Result<PathBuf> {
    let base_dir = in_fq.parent().unwrap_or_else(|| Path::new("."));
    let out_dir = base_dir.join("split");
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let out_fq = out_dir.join(format!("{}_{}.fq", fastq_stem(in_fq), group.founder()));
    let compressed = gz_path(&out_fq);
    if grabix_index_path(&compressed).exists() {
        log::info!("{} already split, skipping", compressed.display());
        return Ok(compressed);
    }

    let written = write_umi_group(in_fq, &out_fq, group)?;
    log::debug!("{} reads for UMI group {}", written, group.founder());
    bgzip_and_index(&out_fq, true)
}

fn prepare_sample(
    sample: &SampleRow,
    data_dir: &Path,
    out_root: &Path,
    config: &Config,
) -> Result<PreparedSample> {
    let layout = AdapterLayout::from_config(
        &config.adapters,
        sample.read1_tag_length()?,
        sample.read2_tag_length()?,
    );
    let fastq1 = sample.find_fastq(data_dir, "R1")?;
    let fastq2 = sample.find_fastq(data_dir, "R2")?;

    let name = sample.name();
    let out_dir = out_root.join(&name);
    let outputs = ExtractOutputs::new(&out_dir, &name);

    if outputs.umi_counts.exists() {
        log::info!("{} already extracted, reusing {}", name, outputs.umi_counts.display());
    } else {
        log::info!(
            "Extracting {} from {} and {}",
            name,
            fastq1.display(),
            fastq2.display()
        );
        extract_sample(&fastq1, &fastq2, &out_dir, &name, &layout, config)?;
    }

    Ok(PreparedSample::new(name, outputs))
}

pub fn run(
    sample_sheet: String,
    data_dir: String,
    out_dir: String,
    config: &Config,
) -> Result<()> {
    check_tool("bgzip")?;
    check_tool("grabix")?;

    let samples = read_sample_sheet(Path::new(&sample_sheet))?;
    log::info!("{} samples in {}", samples.len(), sample_sheet);

    let data_dir = PathBuf::from(data_dir);
    let out_root = std::env::current_dir()?.join(out_dir);
    let prepared = samples
        .iter()
        .map(|sample| prepare_sample(sample, &data_dir, &out_root, config))
        .collect::<Result<Vec<_>>>()?;

    let params = GroupingParams::from(&config.grouping);
    for sample in &prepared {
        for group in umi_groups(&sample.umi_counts, &params)? {
            let out_fq1 = split_umi_group(&sample.fastq1, &group)?;
            let out_fq2 = split_umi_group(&sample.fastq2, &group)?;
            println!(
                "{} {} {} {}",
                sample.name,
                group.founder(),
                out_fq1.display(),
                out_fq2.display()
            );
        }
    }

    Ok(())
}
