//! Adapter-anchored UMI and sample tag extraction.
//!
//! Read layout:
//!
//! ```text
//! Read 1: [tag (4-5N)][index (6)] ADAPTER_1 [insert...]
//! Read 2: [tag (4-5N)][index (6)] ADAPTER_2A [UMI (10N)] ADAPTER_2B [insert...]
//! ```
//!
//! Accepted pairs are renamed so the UMI and sample tag travel with the read:
//!
//! ```text
//! @M03802:306:000000000-BCD3W:1:1101:15879:1332:UMI_NNNNNNNNNN:SAMPLE_NNNN-NNNN 1:N:0:1
//! ```

use crate::config::AdapterConfig;
use bio::io::fastq::Record;
use memchr::memmem;

/// Adapter literals plus the fixed lengths used to slice around them.
#[derive(Debug, Clone)]
pub struct AdapterLayout {
    pub read1: Vec<u8>,
    pub read2_leading: Vec<u8>,
    pub read2_trailing: Vec<u8>,
    pub umi_length: usize,
    pub index_length: usize,
    /// Variable tag length preceding the index on read 1.
    pub read1_tag_length: usize,
    /// Variable tag length preceding the index on read 2.
    pub read2_tag_length: usize,
}

impl AdapterLayout {
    pub fn from_config(config: &AdapterConfig, read1_tag_length: usize, read2_tag_length: usize) -> Self {
        Self {
            read1: config.read1.as_bytes().to_vec(),
            read2_leading: config.read2_leading.as_bytes().to_vec(),
            read2_trailing: config.read2_trailing.as_bytes().to_vec(),
            umi_length: config.umi_length,
            index_length: config.index_length,
            read1_tag_length,
            read2_tag_length,
        }
    }
}

impl Default for AdapterLayout {
    fn default() -> Self {
        let config = AdapterConfig::default();
        let tag_length = config.default_tag_length;
        Self::from_config(&config, tag_length, tag_length)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingAdapter {
    Read1,
    Read2Leading,
    Read2Trailing,
}

#[derive(Debug, Clone)]
pub struct ExtractedPair {
    pub read1: Record,
    pub read2: Record,
    pub umi: String,
    /// `<tag1>-<tag2>`
    pub sample_tag: String,
}

/// Outcome of extracting one read pair.
#[derive(Debug, Clone)]
pub enum Extraction {
    Accepted(ExtractedPair),
    NoAdapterMatch(MissingAdapter),
    /// The trailing read 2 adapter starts at or before the leading one.
    WrongOrder,
    /// Gap between the read 2 adapters, 0 when they overlap.
    BadUmiLength(usize),
}

/// Per-outcome tallies over one extraction pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionStats {
    pub pairs: u64,
    pub accepted: u64,
    pub missing_read1_adapter: u64,
    pub missing_read2_leading_adapter: u64,
    pub missing_read2_trailing_adapter: u64,
    pub wrong_order: u64,
    pub bad_umi_length: u64,
}

impl ExtractionStats {
    pub fn record(&mut self, outcome: &Extraction) {
        self.pairs += 1;
        match outcome {
            Extraction::Accepted(_) => self.accepted += 1,
            Extraction::NoAdapterMatch(MissingAdapter::Read1) => self.missing_read1_adapter += 1,
            Extraction::NoAdapterMatch(MissingAdapter::Read2Leading) => {
                self.missing_read2_leading_adapter += 1
            }
            Extraction::NoAdapterMatch(MissingAdapter::Read2Trailing) => {
                self.missing_read2_trailing_adapter += 1
            }
            Extraction::WrongOrder => self.wrong_order += 1,
            Extraction::BadUmiLength(_) => self.bad_umi_length += 1,
        }
    }

    pub fn rejected(&self) -> u64 {
        self.pairs - self.accepted
    }
}

/// Locates the adapters of a read pair and slices out the sample tag and UMI.
pub fn extract_umi(read1: &Record, read2: &Record, layout: &AdapterLayout) -> Extraction {
    let seq1 = read1.seq();
    let seq2 = read2.seq();

    let Some(r1_pos) = memmem::find(seq1, &layout.read1) else {
        return Extraction::NoAdapterMatch(MissingAdapter::Read1);
    };
    let Some(r2a_pos) = memmem::find(seq2, &layout.read2_leading) else {
        return Extraction::NoAdapterMatch(MissingAdapter::Read2Leading);
    };
    let Some(r2b_pos) = memmem::find(seq2, &layout.read2_trailing) else {
        return Extraction::NoAdapterMatch(MissingAdapter::Read2Trailing);
    };
    if r2b_pos <= r2a_pos {
        return Extraction::WrongOrder;
    }

    let umi_start = r2a_pos + layout.read2_leading.len();
    let umi_length = r2b_pos.saturating_sub(umi_start);
    if umi_length != layout.umi_length {
        return Extraction::BadUmiLength(umi_length);
    }

    let tag1 = sample_tag(seq1, r1_pos, layout.read1_tag_length + layout.index_length);
    let tag2 = sample_tag(seq2, r2a_pos, layout.read2_tag_length + layout.index_length);
    let umi = String::from_utf8_lossy(&seq2[umi_start..r2b_pos]).into_owned();
    let sample_tag = format!(
        "{}-{}",
        String::from_utf8_lossy(tag1),
        String::from_utf8_lossy(tag2)
    );

    let insert1 = r1_pos + layout.read1.len();
    let insert2 = r2b_pos + layout.read2_trailing.len();

    Extraction::Accepted(ExtractedPair {
        read1: trimmed(read1, insert1, &umi, &sample_tag),
        read2: trimmed(read2, insert2, &umi, &sample_tag),
        umi,
        sample_tag,
    })
}

fn sample_tag(seq: &[u8], adapter_pos: usize, span: usize) -> &[u8] {
    &seq[adapter_pos.saturating_sub(span)..adapter_pos]
}

fn trimmed(read: &Record, insert_start: usize, umi: &str, sample_tag: &str) -> Record {
    // bio splits headers on the first space only, so a tab-separated
    // description is still part of the id here.
    let (token, rest) = match read.id().split_once(char::is_whitespace) {
        Some((token, rest)) => (token, Some(rest.trim_start()).filter(|rest| !rest.is_empty())),
        None => (read.id(), None),
    };
    let desc = match (rest, read.desc()) {
        (Some(rest), Some(desc)) => Some(format!("{} {}", rest, desc)),
        (Some(rest), None) => Some(rest.to_string()),
        (None, desc) => desc.map(str::to_string),
    };

    let name = tagged_read_name(token, umi, sample_tag);
    Record::with_attrs(
        &name,
        desc.as_deref(),
        &read.seq()[insert_start..],
        &read.qual()[insert_start..],
    )
}

/// First header token with the UMI and sample tag appended.
pub fn tagged_read_name(id: &str, umi: &str, sample_tag: &str) -> String {
    format!("{}:UMI_{}:SAMPLE_{}", id, umi, sample_tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    const R1_ADAPTER: &str = "TCTGAAAATCCATATAACACTCCAGTATTTGC";
    const R2A_ADAPTER: &str = "TGGTATCGAAGTCATCCTGCTAG";
    const R2B_ADAPTER: &str = "TGGAGTTCATACCCCATCCAAAG";
    const UMI: &str = "ACGTACGTAC";

    fn record(id: &str, desc: Option<&str>, seq: &str) -> Record {
        let qual = "I".repeat(seq.len());
        Record::with_attrs(id, desc, seq.as_bytes(), qual.as_bytes())
    }

    fn pair(r1_prefix: &str, r2_prefix: &str, umi: &str) -> (Record, Record) {
        let seq1 = format!("{}{}GATTACAGATTACA", r1_prefix, R1_ADAPTER);
        let seq2 = format!("{}{}{}{}CCCCGGGG", r2_prefix, R2A_ADAPTER, umi, R2B_ADAPTER);
        (
            record("M03802:306:1101:15879:1332", Some("1:N:0:1"), &seq1),
            record("M03802:306:1101:15879:1332", Some("2:N:0:1"), &seq2),
        )
    }

    #[test]
    fn accepts_well_formed_pair() {
        let (r1, r2) = pair("AAAACCCCCC", "GGGGTTTTTT", UMI);
        let Extraction::Accepted(out) = extract_umi(&r1, &r2, &AdapterLayout::default()) else {
            panic!("pair should be accepted");
        };

        assert_eq!(out.umi, UMI);
        assert_eq!(out.sample_tag, "AAAACCCCCC-GGGGTTTTTT");
        assert_eq!(out.read1.seq(), b"GATTACAGATTACA");
        assert_eq!(out.read2.seq(), b"CCCCGGGG");
        assert_eq!(
            out.read1.id(),
            "M03802:306:1101:15879:1332:UMI_ACGTACGTAC:SAMPLE_AAAACCCCCC-GGGGTTTTTT"
        );
        assert_eq!(out.read1.desc(), Some("1:N:0:1"));
        assert_eq!(out.read2.desc(), Some("2:N:0:1"));
        assert_eq!(out.read2.id().matches("UMI_").count(), 1);
        assert_eq!(out.read2.id().matches("SAMPLE_").count(), 1);
    }

    #[test]
    fn tab_separated_description_follows_the_tag() {
        let (r1, r2) = pair("AAAACCCCCC", "GGGGTTTTTT", UMI);
        let r1 = record("M1:2\t1:N:0:1", None, std::str::from_utf8(r1.seq()).unwrap());
        let r2 = record("M1:2\t2:N:0:1", Some("extra"), std::str::from_utf8(r2.seq()).unwrap());
        let Extraction::Accepted(out) = extract_umi(&r1, &r2, &AdapterLayout::default()) else {
            panic!("pair should be accepted");
        };

        assert_eq!(
            out.read1.id(),
            "M1:2:UMI_ACGTACGTAC:SAMPLE_AAAACCCCCC-GGGGTTTTTT"
        );
        assert_eq!(out.read1.desc(), Some("1:N:0:1"));
        assert_eq!(out.read2.desc(), Some("2:N:0:1 extra"));
    }

    #[test]
    fn trimmed_lengths_follow_adapter_end() {
        let (r1, r2) = pair("AAAACCCCCC", "GGGGTTTTTT", UMI);
        let Extraction::Accepted(out) = extract_umi(&r1, &r2, &AdapterLayout::default()) else {
            panic!("pair should be accepted");
        };

        let r1_end = 10 + R1_ADAPTER.len();
        let r2_end = 10 + R2A_ADAPTER.len() + UMI.len() + R2B_ADAPTER.len();
        assert_eq!(out.read1.seq().len(), r1.seq().len() - r1_end);
        assert_eq!(out.read2.seq().len(), r2.seq().len() - r2_end);
        assert_eq!(out.read1.seq().len(), out.read1.qual().len());
        assert_eq!(out.read2.seq().len(), out.read2.qual().len());
    }

    #[test]
    fn short_prefix_clamps_tag_at_read_start() {
        let (r1, r2) = pair("CCC", "", UMI);
        let Extraction::Accepted(out) = extract_umi(&r1, &r2, &AdapterLayout::default()) else {
            panic!("pair should be accepted");
        };
        assert_eq!(out.sample_tag, "CCC-");
    }

    #[test]
    fn long_prefix_keeps_only_tag_and_index() {
        let (r1, r2) = pair("NNNNNAAAACCCCCC", "GGGGGTTTTTTAAAA", UMI);
        let Extraction::Accepted(out) = extract_umi(&r1, &r2, &AdapterLayout::default()) else {
            panic!("pair should be accepted");
        };
        assert_eq!(out.sample_tag, "AAAACCCCCC-TTTTTTAAAA");
    }

    #[test]
    fn tag_lengths_are_configurable() {
        let (r1, r2) = pair("AAAAACCCCCC", "GGGGGTTTTTT", UMI);
        let layout = AdapterLayout::from_config(&AdapterConfig::default(), 5, 4);
        let Extraction::Accepted(out) = extract_umi(&r1, &r2, &layout) else {
            panic!("pair should be accepted");
        };
        assert_eq!(out.sample_tag, "AAAAACCCCCC-GGGGTTTTTT");
    }

    #[test]
    fn missing_adapters_are_classified() {
        let layout = AdapterLayout::default();
        let (r1, r2) = pair("AAAA", "GGGG", UMI);
        let no_adapter = record("x", None, "ACGTACGTACGTACGTACGT");

        assert!(matches!(
            extract_umi(&no_adapter, &r2, &layout),
            Extraction::NoAdapterMatch(MissingAdapter::Read1)
        ));
        assert!(matches!(
            extract_umi(&r1, &no_adapter, &layout),
            Extraction::NoAdapterMatch(MissingAdapter::Read2Leading)
        ));

        let only_leading = record("x", None, &format!("GGGG{}{}AAAA", R2A_ADAPTER, UMI));
        assert!(matches!(
            extract_umi(&r1, &only_leading, &layout),
            Extraction::NoAdapterMatch(MissingAdapter::Read2Trailing)
        ));
    }

    #[test]
    fn trailing_adapter_before_leading_is_rejected() {
        let r1 = pair("AAAA", "GGGG", UMI).0;
        let swapped = record("x", None, &format!("GGGG{}{}{}AAAA", R2B_ADAPTER, UMI, R2A_ADAPTER));
        assert!(matches!(
            extract_umi(&r1, &swapped, &AdapterLayout::default()),
            Extraction::WrongOrder
        ));
    }

    #[test]
    fn wrong_umi_length_is_rejected() {
        let layout = AdapterLayout::default();
        let (r1, r2) = pair("AAAA", "GGGG", "ACGTACGTA");
        assert!(matches!(
            extract_umi(&r1, &r2, &layout),
            Extraction::BadUmiLength(9)
        ));

        let (r1, r2) = pair("AAAA", "GGGG", "ACGTACGTACG");
        assert!(matches!(
            extract_umi(&r1, &r2, &layout),
            Extraction::BadUmiLength(11)
        ));

        let (r1, r2) = pair("AAAA", "GGGG", "");
        assert!(matches!(
            extract_umi(&r1, &r2, &layout),
            Extraction::BadUmiLength(0)
        ));
    }

    #[test]
    fn overlapping_read2_adapters_have_no_umi() {
        let layout = AdapterLayout {
            read2_leading: b"AAACCC".to_vec(),
            read2_trailing: b"CCCGGG".to_vec(),
            ..AdapterLayout::default()
        };
        let r1 = pair("AAAA", "GGGG", UMI).0;
        let r2 = record("x", None, "TTAAACCCGGGTT");
        assert!(matches!(
            extract_umi(&r1, &r2, &layout),
            Extraction::BadUmiLength(0)
        ));
    }

    #[test]
    fn stats_tally_each_outcome() {
        let mut stats = ExtractionStats::default();
        stats.record(&Extraction::WrongOrder);
        stats.record(&Extraction::BadUmiLength(3));
        stats.record(&Extraction::NoAdapterMatch(MissingAdapter::Read2Trailing));
        let (r1, r2) = pair("AAAA", "GGGG", UMI);
        stats.record(&extract_umi(&r1, &r2, &AdapterLayout::default()));

        assert_eq!(stats.pairs, 4);
        assert_eq!(stats.accepted, 1);
        assert_eq!(stats.rejected(), 3);
        assert_eq!(stats.wrong_order, 1);
        assert_eq!(stats.bad_umi_length, 1);
        assert_eq!(stats.missing_read2_trailing_adapter, 1);
    }
}
