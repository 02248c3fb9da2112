//! Alignment results attached to reads by an aligner plugin.
//!
//! Records are assembled by the plugin with the builder-style `with_*`
//! methods and are read-only once attached to a [`crate::ReadBatch`].

use std::collections::BTreeMap;

use crate::core::cigar::Cigar;
use crate::core::contig::Contig;
use crate::core::reference::{ContigRef, ReferenceCatalog};
use crate::core::tag::{validate_tag_key, TagValue};
use crate::error::{Error, Result};

/// Tags whose content is carried by a dedicated record field
const FIELD_TAGS: [&str; 2] = ["NM", "AS"];

/// Mapping flags of an alignment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlignmentFlags {
    pub paired: bool,
    pub properly_paired: bool,
    pub mapped: bool,
    pub reverse_strand: bool,
    pub secondary: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentRecord {
    contig: Option<ContigRef>,
    position: u64,
    cigar: Cigar,
    mapping_quality: u8,
    score: i32,
    flags: AlignmentFlags,
    mismatch_count: u32,
    gap_open_count: u32,
    gap_extension_count: u32,
    tags: Vec<(String, TagValue)>,
}

impl AlignmentRecord {
    /// A record for a read that did not align anywhere
    #[must_use]
    pub fn unmapped() -> Self {
        Self {
            contig: None,
            position: 0,
            cigar: Cigar::default(),
            mapping_quality: 0,
            score: 0,
            flags: AlignmentFlags::default(),
            mismatch_count: 0,
            gap_open_count: 0,
            gap_extension_count: 0,
            tags: Vec::new(),
        }
    }

    /// A record aligned to `contig` at the 0-based `position`
    #[must_use]
    pub fn aligned(contig: ContigRef, position: u64) -> Self {
        let mut record = Self::unmapped();
        record.contig = Some(contig);
        record.position = position;
        record.flags.mapped = true;
        record
    }

    #[must_use]
    pub fn with_cigar(mut self, cigar: Cigar) -> Self {
        self.cigar = cigar;
        self
    }

    #[must_use]
    pub fn with_mapq(mut self, mapq: u8) -> Self {
        self.mapping_quality = mapq;
        self
    }

    #[must_use]
    pub fn with_score(mut self, score: i32) -> Self {
        self.score = score;
        self
    }

    #[must_use]
    pub fn with_flags(mut self, flags: AlignmentFlags) -> Self {
        self.flags = flags;
        self
    }

    #[must_use]
    pub fn with_reverse_strand(mut self, reverse: bool) -> Self {
        self.flags.reverse_strand = reverse;
        self
    }

    #[must_use]
    pub fn with_proper_pair(mut self, properly_paired: bool) -> Self {
        self.flags.properly_paired = properly_paired;
        self
    }

    #[must_use]
    pub fn with_secondary(mut self, secondary: bool) -> Self {
        self.flags.secondary = secondary;
        self
    }

    #[must_use]
    pub fn with_counts(mut self, mismatches: u32, gap_opens: u32, gap_extensions: u32) -> Self {
        self.mismatch_count = mismatches;
        self.gap_open_count = gap_opens;
        self.gap_extension_count = gap_extensions;
        self
    }

    /// Add or replace an optional tag
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` if `key` is not a valid SAM tag name.
    pub fn with_tag(mut self, key: &str, value: impl Into<TagValue>) -> Result<Self> {
        validate_tag_key(key)?;
        let value = value.into();
        if let Some(slot) = self.tags.iter_mut().find(|(k, _)| k == key) {
            slot.1 = value;
        } else {
            self.tags.push((key.to_string(), value));
        }
        Ok(self)
    }

    pub(crate) fn set_paired(&mut self, paired: bool) {
        self.flags.paired = paired;
    }

    #[must_use]
    pub fn contig_ref(&self) -> Option<ContigRef> {
        self.contig
    }

    /// The contig this record aligns to, if `catalog` is the reference it
    /// was computed against
    #[must_use]
    pub fn contig<'a>(&self, catalog: &'a ReferenceCatalog) -> Option<&'a Contig> {
        self.contig.and_then(|c| catalog.resolve(c))
    }

    /// 0-based leftmost position
    #[must_use]
    pub fn position(&self) -> u64 {
        self.position
    }

    #[must_use]
    pub fn cigar(&self) -> &Cigar {
        &self.cigar
    }

    #[must_use]
    pub fn cigar_string(&self) -> String {
        self.cigar.to_string()
    }

    #[must_use]
    pub fn cigar_ops(&self) -> Vec<(char, u32)> {
        self.cigar.ops().map(|op| op.as_pair()).collect()
    }

    #[must_use]
    pub fn reference_span(&self) -> u64 {
        self.cigar.reference_span()
    }

    #[must_use]
    pub fn mapq(&self) -> u8 {
        self.mapping_quality
    }

    #[must_use]
    pub fn score(&self) -> i32 {
        self.score
    }

    #[must_use]
    pub fn flags(&self) -> AlignmentFlags {
        self.flags
    }

    #[must_use]
    pub fn paired(&self) -> bool {
        self.flags.paired
    }

    #[must_use]
    pub fn prop_paired(&self) -> bool {
        self.flags.properly_paired
    }

    #[must_use]
    pub fn mapped(&self) -> bool {
        self.flags.mapped
    }

    #[must_use]
    pub fn reverse_strand(&self) -> bool {
        self.flags.reverse_strand
    }

    #[must_use]
    pub fn secondary(&self) -> bool {
        self.flags.secondary
    }

    #[must_use]
    pub fn n_mismatches(&self) -> u32 {
        self.mismatch_count
    }

    #[must_use]
    pub fn n_gap_opens(&self) -> u32 {
        self.gap_open_count
    }

    #[must_use]
    pub fn n_gap_extensions(&self) -> u32 {
        self.gap_extension_count
    }

    /// Optional tags, excluding those exposed as typed fields (`NM`, `AS`)
    #[must_use]
    pub fn tags(&self) -> BTreeMap<String, TagValue> {
        self.extra_tags()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[must_use]
    pub fn tag(&self, key: &str) -> Option<&TagValue> {
        self.extra_tags().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    /// Optional tags in insertion order, excluding `NM` and `AS`
    pub fn extra_tags(&self) -> impl Iterator<Item = (&str, &TagValue)> {
        self.tags
            .iter()
            .filter(|(k, _)| !FIELD_TAGS.contains(&k.as_str()))
            .map(|(k, v)| (k.as_str(), v))
    }

    /// Reference coordinate of the 5' end of the read
    fn five_prime(&self) -> Result<i64> {
        if self.cigar.is_empty() {
            return Err(Error::invalid("mapped alignment has no CIGAR operations"));
        }
        let pos = to_i64(self.position)?;
        if self.flags.reverse_strand {
            Ok(pos + to_i64(self.reference_span())? - 1)
        } else {
            Ok(pos)
        }
    }
}

fn to_i64(value: u64) -> Result<i64> {
    i64::try_from(value).map_err(|_| Error::invalid(format!("coordinate {value} overflows")))
}

/// Signed template length from `read` to `mate`.
///
/// Zero unless both are mapped to the same contig. The result is
/// antisymmetric and zero for a record paired with itself.
///
/// # Errors
///
/// Returns `Error::InvalidArgument` if a mapped record has no CIGAR.
pub fn insert_size(read: &AlignmentRecord, mate: &AlignmentRecord) -> Result<i64> {
    let same_contig = read.contig.is_some() && read.contig == mate.contig;
    if !(read.mapped() && mate.mapped() && same_contig) {
        return Ok(0);
    }

    let p0 = read.five_prime()?;
    let p1 = mate.five_prime()?;
    let d = p1 - p0;
    Ok(d + d.signum())
}

/// Read-only iterator over the alignments of one read
#[derive(Debug, Clone)]
pub struct AlignmentIter<'a> {
    inner: std::slice::Iter<'a, AlignmentRecord>,
}

impl<'a> AlignmentIter<'a> {
    pub(crate) fn new(alignments: &'a [AlignmentRecord]) -> Self {
        Self {
            inner: alignments.iter(),
        }
    }
}

impl<'a> Iterator for AlignmentIter<'a> {
    type Item = &'a AlignmentRecord;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for AlignmentIter<'_> {}
