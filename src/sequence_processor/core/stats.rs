#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingStats {
    pub processed: u64,
    pub accepted: u64,
    /// Unmapped records.
    pub skipped: u64,
    /// Mapped records without any UMI tag.
    pub untagged: u64,
}
