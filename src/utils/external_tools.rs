//! Block compression and indexing are delegated to `bgzip` and `grabix`.

use crate::error::UmiPrepError;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

pub fn check_tool(tool: &str) -> Result<()> {
    Command::new(tool)
        .arg("--help")
        .output()
        .with_context(|| {
            format!(
                "{} not found. Please install it (http://www.htslib.org/ for bgzip, \
                 https://github.com/arq5x/grabix for grabix) and ensure it's in your PATH",
                tool
            )
        })
        .map(|_| ())
}

fn run(tool: &str, args: &[&str]) -> Result<()> {
    log::debug!("Running {} {}", tool, args.join(" "));
    let output = Command::new(tool)
        .args(args)
        .output()
        .with_context(|| format!("Failed to run {}", tool))?;

    if !output.status.success() {
        return Err(UmiPrepError::ToolFailed {
            tool: tool.to_string(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
        .into());
    }
    Ok(())
}

/// Compresses `path` in place, returning the `.gz` path `bgzip` leaves behind.
pub fn bgzip(path: &Path, force: bool) -> Result<PathBuf> {
    let path_str = path.to_string_lossy().into_owned();
    if force {
        run("bgzip", &["-f", path_str.as_str()])?;
    } else {
        run("bgzip", &[path_str.as_str()])?;
    }
    Ok(gz_path(path))
}

pub fn grabix_index(path: &Path) -> Result<()> {
    let path_str = path.to_string_lossy().into_owned();
    run("grabix", &["index", path_str.as_str()])
}

/// Compress then index, the finishing step for every FASTQ this tool writes.
pub fn bgzip_and_index(path: &Path, force: bool) -> Result<PathBuf> {
    let compressed = bgzip(path, force)?;
    grabix_index(&compressed)?;
    Ok(compressed)
}

pub fn gz_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".gz");
    PathBuf::from(name)
}

/// Index file grabix writes next to a compressed FASTQ.
pub fn grabix_index_path(compressed: &Path) -> PathBuf {
    let mut name = compressed.as_os_str().to_owned();
    name.push(".gbi");
    PathBuf::from(name)
}
