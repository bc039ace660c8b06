use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub adapters: AdapterConfig,
    #[serde(default)]
    pub grouping: GroupingConfig,
    #[serde(default)]
    pub summary: SummaryConfig,
    /// Number of most abundant UMIs echoed after extraction
    #[serde(default = "default_report_top")]
    pub report_top: usize,
}

/// Adapter literals and fixed lengths of the read layout.
///
/// Read 1: index (4-5N) + 6bp index + `read1` adapter + insert.
/// Read 2: index (4-5N) + 6bp index + `read2_leading` + UMI + `read2_trailing` + insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdapterConfig {
    #[serde(default = "default_read1_adapter")]
    pub read1: String,
    #[serde(default = "default_read2_leading_adapter")]
    pub read2_leading: String,
    #[serde(default = "default_read2_trailing_adapter")]
    pub read2_trailing: String,
    #[serde(default = "default_umi_length")]
    pub umi_length: usize,
    #[serde(default = "default_index_length")]
    pub index_length: usize,
    #[serde(default = "default_tag_length")]
    pub default_tag_length: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupingConfig {
    #[serde(default = "default_min_umi_count")]
    pub min_umi_count: u64,
    #[serde(default = "default_min_add_multiplier")]
    pub min_add_multiplier: u64,
    #[serde(default = "default_allowed_edits")]
    pub allowed_edits: u32,
    #[serde(default = "default_max_groups")]
    pub max_groups: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryConfig {
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default = "default_umi_tags")]
    pub umi_tags: Vec<String>,
    #[serde(default = "default_sample_suffix")]
    pub sample_suffix: String,
    #[serde(default = "default_summary_output")]
    pub output: String,
}

fn default_report_top() -> usize {
    6
}

fn default_read1_adapter() -> String {
    "TCTGAAAATCCATATAACACTCCAGTATTTGC".to_string()
}

fn default_read2_leading_adapter() -> String {
    "TGGTATCGAAGTCATCCTGCTAG".to_string()
}

fn default_read2_trailing_adapter() -> String {
    "TGGAGTTCATACCCCATCCAAAG".to_string()
}

fn default_umi_length() -> usize {
    10
}

fn default_index_length() -> usize {
    6
}

fn default_tag_length() -> usize {
    4
}

fn default_min_umi_count() -> u64 {
    50
}

fn default_min_add_multiplier() -> u64 {
    5
}

fn default_allowed_edits() -> u32 {
    2
}

fn default_max_groups() -> usize {
    10
}

fn default_top_n() -> usize {
    50
}

fn default_umi_tags() -> Vec<String> {
    vec!["RX".to_string(), "XC".to_string()]
}

fn default_sample_suffix() -> String {
    "-sort.bam".to_string()
}

fn default_summary_output() -> String {
    "top_umi_counts.csv".to_string()
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            read1: default_read1_adapter(),
            read2_leading: default_read2_leading_adapter(),
            read2_trailing: default_read2_trailing_adapter(),
            umi_length: default_umi_length(),
            index_length: default_index_length(),
            default_tag_length: default_tag_length(),
        }
    }
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            min_umi_count: default_min_umi_count(),
            min_add_multiplier: default_min_add_multiplier(),
            allowed_edits: default_allowed_edits(),
            max_groups: default_max_groups(),
        }
    }
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            umi_tags: default_umi_tags(),
            sample_suffix: default_sample_suffix(),
            output: default_summary_output(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            adapters: AdapterConfig::default(),
            grouping: GroupingConfig::default(),
            summary: SummaryConfig::default(),
            report_top: default_report_top(),
        }
    }
}

impl Config {
    /// Loads `config.toml` from the user config directory, falling back to defaults.
    pub fn load() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("org", "umi-prep", "umi-prep") {
            let config_path = proj_dirs.config_dir().join("config.toml");

            if config_path.exists() {
                match Self::load_from(&config_path) {
                    Ok(config) => return config,
                    Err(e) => log::warn!("Ignoring {}: {:#}", config_path.display(), e),
                }
            }
        }
        Config::default()
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))
    }

    /// An explicit path must load; otherwise use the user config or defaults.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => Ok(Self::load()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}
