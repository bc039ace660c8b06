//! Greedy grouping of UMIs within a small edit distance.
//!
//! This is a heuristic, not a clustering with a bounded radius. Rows are
//! visited in input order and each admitted UMI joins the first group (in
//! creation order) holding any member within `allowed_edits`. Membership
//! chains transitively through non-representative members, so a group's
//! diameter is unbounded and the result depends on row order.

use crate::config::GroupingConfig;
use bio::alignment::distance::simd::bounded_levenshtein;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupingParams {
    /// UMIs must be seen more often than this to be admitted.
    pub min_umi_count: u64,
    /// Groups must total more than `min_umi_count * min_add_multiplier`.
    pub min_add_multiplier: u64,
    pub allowed_edits: u32,
    pub max_groups: usize,
}

impl GroupingParams {
    pub fn min_group_count(&self) -> u64 {
        self.min_umi_count * self.min_add_multiplier
    }
}

impl From<&GroupingConfig> for GroupingParams {
    fn from(config: &GroupingConfig) -> Self {
        Self {
            min_umi_count: config.min_umi_count,
            min_add_multiplier: config.min_add_multiplier,
            allowed_edits: config.allowed_edits,
            max_groups: config.max_groups,
        }
    }
}

impl Default for GroupingParams {
    fn default() -> Self {
        Self::from(&GroupingConfig::default())
    }
}

/// A non-empty set of UMIs with their summed count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UmiGroup {
    /// Members in admission order; the first is the founding UMI.
    umis: Vec<String>,
    count: u64,
}

impl UmiGroup {
    pub fn new(umi: impl Into<String>, count: u64) -> Self {
        Self {
            umis: vec![umi.into()],
            count,
        }
    }

    /// Admits another member and adds its count.
    pub fn add(&mut self, umi: impl Into<String>, count: u64) {
        self.umis.push(umi.into());
        self.count += count;
    }

    pub fn umis(&self) -> &[String] {
        &self.umis
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn founder(&self) -> &str {
        &self.umis[0]
    }

    fn is_near(&self, umi: &str, allowed_edits: u32) -> bool {
        self.umis
            .iter()
            .any(|member| bounded_levenshtein(umi.as_bytes(), member.as_bytes(), allowed_edits).is_some())
    }

    /// True when `read_name` carries the `UMI_<u>` token of any member.
    pub fn matches_read_name(&self, read_name: &str) -> bool {
        self.umis
            .iter()
            .any(|umi| read_name.contains(&format!("UMI_{}", umi)))
    }
}

/// Groups `(umi, count)` rows and returns the largest groups, biggest first.
pub fn prepare_umi_groups<I, S>(rows: I, params: &GroupingParams) -> Vec<UmiGroup>
where
    I: IntoIterator<Item = (S, u64)>,
    S: Into<String>,
{
    let mut groups: Vec<UmiGroup> = Vec::new();

    for (umi, count) in rows {
        if count <= params.min_umi_count {
            continue;
        }
        let umi: String = umi.into();
        match groups
            .iter_mut()
            .find(|group| group.is_near(&umi, params.allowed_edits))
        {
            Some(group) => group.add(umi, count),
            None => groups.push(UmiGroup::new(umi, count)),
        }
    }

    let min_group_count = params.min_group_count();
    let mut kept: Vec<UmiGroup> = groups
        .into_iter()
        .filter(|group| group.count > min_group_count)
        .collect();
    kept.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| b.umis.cmp(&a.umis)));
    kept.truncate(params.max_groups);
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groups(rows: &[(&str, u64)]) -> Vec<UmiGroup> {
        prepare_umi_groups(rows.iter().copied(), &GroupingParams::default())
    }

    #[test]
    fn near_umis_merge_and_sum() {
        let result = groups(&[("AAAAAAAAAA", 200), ("AAAAAAAACC", 100)]);
        assert_eq!(
            result,
            vec![UmiGroup {
                umis: vec!["AAAAAAAAAA".to_string(), "AAAAAAAACC".to_string()],
                count: 300,
            }]
        );
    }

    #[test]
    fn founder_stays_first_as_members_join() {
        let mut group = UmiGroup::new("AAAAAAAAAA", 60);
        group.add("AAAAAAAAAC", 70);
        group.add("AAAAAAAACC", 80);

        assert_eq!(group.founder(), "AAAAAAAAAA");
        assert_eq!(group.umis().len(), 3);
        assert_eq!(group.count(), 210);
    }

    #[test]
    fn three_edits_start_a_new_group() {
        let result = groups(&[("AAAAAAAAAA", 400), ("AAAAAAACCC", 300)]);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].umis, vec!["AAAAAAAAAA"]);
        assert_eq!(result[1].umis, vec!["AAAAAAACCC"]);
    }

    #[test]
    fn indels_count_as_edits() {
        let result = groups(&[("ACGTACGTAC", 200), ("CGTACGTACG", 100)]);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].count, 300);
    }

    #[test]
    fn rare_umis_are_not_admitted() {
        // 50 is not above the floor, so it cannot rescue the 220 group
        let result = groups(&[("AAAAAAAAAA", 220), ("AAAAAAAAAC", 50)]);
        assert!(result.is_empty());
    }

    #[test]
    fn small_groups_are_dropped() {
        let result = groups(&[("AAAAAAAAAA", 250), ("CCCCCCCCCC", 251)]);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].founder(), "CCCCCCCCCC");
    }

    #[test]
    fn membership_chains_through_any_member() {
        // Third UMI is 4 edits from the founder but 2 from the second member
        let result = groups(&[
            ("AAAAAAAAAA", 100),
            ("AAAAAAAACC", 100),
            ("AAAAAACCCC", 100),
        ]);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].umis.len(), 3);
        assert_eq!(result[0].count, 300);
    }

    #[test]
    fn first_matching_group_wins() {
        // Within two edits of both groups; joins the earlier one
        let result = groups(&[
            ("AAAAAAAAAA", 300),
            ("AAAAAACCCC", 300),
            ("AAAAAAAACC", 100),
        ]);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].founder(), "AAAAAAAAAA");
        assert_eq!(result[0].count, 400);
        assert_eq!(result[1].count, 300);
    }

    #[test]
    fn capped_and_ordered_by_count() {
        let bases = [b'A', b'C', b'G', b'T'];
        let mut rows = Vec::new();
        for (i, &first) in bases.iter().enumerate() {
            for (j, &second) in bases.iter().enumerate() {
                // Distinct halves keep every pair of UMIs well apart
                let umi: String = std::iter::repeat(first as char)
                    .take(5)
                    .chain(std::iter::repeat(second as char).take(5))
                    .collect();
                rows.push((umi, 300 + (i * 4 + j) as u64));
            }
        }
        let result = prepare_umi_groups(rows, &GroupingParams::default());

        assert_eq!(result.len(), 10);
        assert!(result.windows(2).all(|w| w[0].count > w[1].count));
        assert_eq!(result[0].count, 315);
    }
}
