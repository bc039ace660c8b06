use crate::error::UmiPrepError;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// One sequencing sample; columns not named here are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SampleRow {
    #[serde(rename = "Sample_Project")]
    pub project: String,
    #[serde(rename = "Sample_ID")]
    pub sample_id: String,
    #[serde(rename = "N_index1_setup")]
    pub index1_setup: String,
    #[serde(rename = "N_index2_setup")]
    pub index2_setup: String,
}

impl SampleRow {
    /// `<project>_<sample id>`, used for output directories and file names.
    pub fn name(&self) -> String {
        format!("{}_{}", self.project, self.sample_id)
    }

    pub fn read1_tag_length(&self) -> Result<usize> {
        tag_length(&self.index1_setup)
    }

    pub fn read2_tag_length(&self) -> Result<usize> {
        tag_length(&self.index2_setup)
    }

    /// Glob prefix of this sample's FASTQs below `data_dir`.
    pub fn fastq_prefix(&self, data_dir: &Path) -> String {
        let project = glob::Pattern::escape(&self.project);
        let sample_id = glob::Pattern::escape(&self.sample_id);
        format!(
            "{}/{}*/BaseSpace*/{}*/{}",
            glob::Pattern::escape(&data_dir.to_string_lossy()),
            project,
            sample_id,
            sample_id
        )
    }

    /// First FASTQ (in path order) for `mate`, e.g. `"R1"`.
    pub fn find_fastq(&self, data_dir: &Path, mate: &str) -> Result<PathBuf> {
        let pattern = format!(
            "{}*_{}_*.fastq.gz",
            self.fastq_prefix(data_dir),
            mate
        );
        let mut matches = glob::glob(&pattern)
            .with_context(|| format!("Invalid FASTQ pattern {}", pattern))?
            .collect::<Result<Vec<_>, _>>()?;
        matches.sort();

        match matches.into_iter().next() {
            Some(path) => Ok(path),
            None => {
                log::error!("No FASTQ found for {}: {}", self.name(), pattern);
                Err(UmiPrepError::MissingFastq(pattern).into())
            }
        }
    }
}

/// Leading tag length of an index setup value such as `4N` or `5N+6`.
pub fn tag_length(setup: &str) -> Result<usize> {
    let digits: String = setup
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits
        .parse()
        .map_err(|_| UmiPrepError::InvalidTagSetup(setup.to_string()).into())
}

/// Reads every sample from a CSV sample sheet.
pub fn read_sample_sheet(path: &Path) -> Result<Vec<SampleRow>> {
    let is_excel = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| matches!(ext.to_ascii_lowercase().as_str(), "xlsx" | "xls" | "xlsm"));
    if is_excel {
        return Err(UmiPrepError::UnsupportedSampleSheet(path.to_path_buf()).into());
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open sample sheet {}", path.display()))?;

    reader
        .deserialize::<SampleRow>()
        .enumerate()
        .map(|(i, row)| {
            row.with_context(|| format!("Invalid sample {} in {}", i + 1, path.display()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn row() -> SampleRow {
        SampleRow {
            project: "Proj".to_string(),
            sample_id: "S1".to_string(),
            index1_setup: "4N".to_string(),
            index2_setup: "5N+6".to_string(),
        }
    }

    #[test]
    fn parses_tag_lengths() {
        assert_eq!(tag_length("4N").unwrap(), 4);
        assert_eq!(tag_length(" 5N+6").unwrap(), 5);
        assert_eq!(tag_length("12").unwrap(), 12);
        assert!(tag_length("N4").is_err());
        assert!(tag_length("").is_err());
    }

    #[test]
    fn reads_csv_and_ignores_extra_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("samples.csv");
        fs::write(
            &path,
            "Sample_ID,Sample_Project,Description,N_index1_setup,N_index2_setup\n\
             S1,Proj,first,4N,5N\n\
             S2,Proj,second,5N,4N\n",
        )
        .unwrap();

        let samples = read_sample_sheet(&path).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0], SampleRow {
            index2_setup: "5N".to_string(),
            ..row()
        });
        assert_eq!(samples[1].name(), "Proj_S2");
        assert_eq!(samples[1].read1_tag_length().unwrap(), 5);
    }

    #[test]
    fn excel_sheets_are_rejected() {
        let err = read_sample_sheet(Path::new("summary.xlsx")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<UmiPrepError>(),
            Some(UmiPrepError::UnsupportedSampleSheet(_))
        ));
    }

    #[test]
    fn finds_fastqs_below_basespace_layout() {
        let dir = tempfile::tempdir().unwrap();
        let sample_dir = dir.path().join("Proj-123/BaseSpace-run/S1-ds.abc");
        fs::create_dir_all(&sample_dir).unwrap();
        fs::write(sample_dir.join("S1_S1_L001_R1_001.fastq.gz"), b"").unwrap();
        fs::write(sample_dir.join("S1_S1_L001_R2_001.fastq.gz"), b"").unwrap();

        let sample = row();
        assert_eq!(
            sample.find_fastq(dir.path(), "R1").unwrap(),
            sample_dir.join("S1_S1_L001_R1_001.fastq.gz")
        );
        assert_eq!(
            sample.find_fastq(dir.path(), "R2").unwrap(),
            sample_dir.join("S1_S1_L001_R2_001.fastq.gz")
        );
    }

    #[test]
    fn missing_fastq_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let err = row().find_fastq(dir.path(), "R1").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<UmiPrepError>(),
            Some(UmiPrepError::MissingFastq(_))
        ));
    }
}
