use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;

/// Occurrences of each extracted UMI over one pass.
#[derive(Debug, Default, Clone)]
pub struct UmiCounts {
    counts: HashMap<String, u64>,
}

impl UmiCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, umi: &str) {
        match self.counts.get_mut(umi) {
            Some(count) => *count += 1,
            None => {
                self.counts.insert(umi.to_string(), 1);
            }
        }
    }

    pub fn get(&self, umi: &str) -> u64 {
        self.counts.get(umi).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Most abundant first; equal counts fall back to the UMI, descending.
    pub fn sorted(&self) -> Vec<(&str, u64)> {
        let mut sorted: Vec<_> = self
            .counts
            .iter()
            .map(|(umi, &count)| (umi.as_str(), count))
            .collect();
        sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| b.0.cmp(a.0)));
        sorted
    }

    /// Writes the headerless `umi,count` table, most abundant first.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        for (umi, count) in self.sorted() {
            writer.serialize((umi, count))?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Loads a headerless `umi,count` table, keeping file order.
pub fn read_umi_counts(path: &Path) -> Result<Vec<(String, u64)>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open UMI counts {}", path.display()))?;

    reader
        .deserialize::<(String, u64)>()
        .enumerate()
        .map(|(i, row)| {
            row.with_context(|| format!("Invalid row {} in {}", i + 1, path.display()))
        })
        .collect()
}
