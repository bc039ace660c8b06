use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TagKey {
    pub reference: String,
    /// 0-based alignment start.
    pub position: i64,
    pub umi: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagCount {
    pub key: TagKey,
    pub count: u64,
}

/// Occurrences of each (reference, position, UMI) triple in one alignment file.
#[derive(Debug, Default)]
pub struct TagCounter {
    counts: HashMap<TagKey, u64>,
}

impl TagCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, reference: &str, position: i64, umi: &str) {
        let key = TagKey {
            reference: reference.to_string(),
            position,
            umi: umi.to_string(),
        };
        *self.counts.entry(key).or_insert(0) += 1;
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn get(&self, reference: &str, position: i64, umi: &str) -> u64 {
        let key = TagKey {
            reference: reference.to_string(),
            position,
            umi: umi.to_string(),
        };
        self.counts.get(&key).copied().unwrap_or(0)
    }

    /// The `n` most frequent triples; ties order by reference, position, then UMI, all descending.
    pub fn top(self, n: usize) -> Vec<TagCount> {
        let mut counts: Vec<TagCount> = self
            .counts
            .into_iter()
            .map(|(key, count)| TagCount { key, count })
            .collect();
        counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| b.key.cmp(&a.key)));
        counts.truncate(n);
        counts
    }
}

/// Sample name of an alignment file: its base name minus `suffix`.
pub fn sample_name(base_name: &str, suffix: &str) -> String {
    base_name.replace(suffix, "")
}
