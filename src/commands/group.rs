use crate::config::Config;
use crate::umi::{prepare_umi_groups, read_umi_counts, GroupingParams, UmiGroup};
use anyhow::Result;
use std::path::Path;

/// Groups the UMIs of a `-umicounts.csv` table.
pub fn umi_groups(umi_counts: &Path, params: &GroupingParams) -> Result<Vec<UmiGroup>> {
    let rows = read_umi_counts(umi_counts)?;
    let groups = prepare_umi_groups(rows, params);
    log::info!(
        "{} UMI groups above {} reads in {}",
        groups.len(),
        params.min_group_count(),
        umi_counts.display()
    );
    Ok(groups)
}

pub fn run(umi_counts: String, config: &Config) -> Result<()> {
    let params = GroupingParams::from(&config.grouping);
    for (rank, group) in umi_groups(Path::new(&umi_counts), &params)?
        .iter()
        .enumerate()
    {
        println!("{}\t{}\t{}", rank + 1, group.count(), group.umis().join(","));
    }
    Ok(())
}
