use crate::core::alignment::{AlignmentIter, AlignmentRecord};
use crate::error::{Error, Result};

/// One sequenced read stored in a [`crate::ReadBatch`].
///
/// Quality, when present, is Sanger-encoded and as long as the sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Read {
    id: String,
    sequence: String,
    quality: Option<String>,
    alignments: Vec<AlignmentRecord>,
}

impl Read {
    pub(crate) fn new(id: String, sequence: String, quality: Option<String>) -> Self {
        Self {
            id,
            sequence,
            quality,
            alignments: Vec::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn seq(&self) -> &str {
        &self.sequence
    }

    #[must_use]
    pub fn qual(&self) -> Option<&str> {
        self.quality.as_deref()
    }

    /// Sequence length
    #[must_use]
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    #[must_use]
    pub fn n_alignments(&self) -> usize {
        self.alignments.len()
    }

    /// # Errors
    ///
    /// Returns `Error::Index` if `index` is not in `[0, n_alignments)`.
    pub fn get_aln(&self, index: usize) -> Result<&AlignmentRecord> {
        self.alignments.get(index).ok_or(Error::Index {
            what: "alignment",
            index,
            bound: self.alignments.len(),
        })
    }

    pub fn iter_aln(&self) -> AlignmentIter<'_> {
        AlignmentIter::new(&self.alignments)
    }

    #[must_use]
    pub fn alignments(&self) -> &[AlignmentRecord] {
        &self.alignments
    }

    pub(crate) fn set_alignments(&mut self, alignments: Vec<AlignmentRecord>) {
        self.alignments = alignments;
    }

    // Shortcuts to the primary (first) alignment. A read without alignments
    // reads as unmapped.

    #[must_use]
    pub fn mapped(&self) -> bool {
        self.alignments.first().is_some_and(AlignmentRecord::mapped)
    }

    #[must_use]
    pub fn prop_paired(&self) -> bool {
        self.alignments
            .first()
            .is_some_and(AlignmentRecord::prop_paired)
    }

    #[must_use]
    pub fn reverse_strand(&self) -> bool {
        self.alignments
            .first()
            .is_some_and(AlignmentRecord::reverse_strand)
    }

    #[must_use]
    pub fn mapq(&self) -> Option<u8> {
        self.alignments.first().map(AlignmentRecord::mapq)
    }

    #[must_use]
    pub fn score(&self) -> Option<i32> {
        self.alignments.first().map(AlignmentRecord::score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_accessors() {
        let read = Read::new("r1".into(), "ACGT".into(), Some("EEEE".into()));
        assert_eq!(read.id(), "r1");
        assert_eq!(read.seq(), "ACGT");
        assert_eq!(read.qual(), Some("EEEE"));
        assert_eq!(read.len(), 4);
        assert_eq!(read.n_alignments(), 0);
        assert!(!read.mapped());
        assert_eq!(read.mapq(), None);
    }

    #[test]
    fn test_alignment_access() {
        let mut read = Read::new("r1".into(), "ACGT".into(), None);
        read.set_alignments(vec![
            AlignmentRecord::unmapped().with_score(7),
            AlignmentRecord::unmapped().with_score(3),
        ]);
        assert_eq!(read.n_alignments(), 2);
        assert_eq!(read.get_aln(1).unwrap().score(), 3);
        assert_eq!(read.get_aln(2).unwrap_err().kind(), ErrorKind::Index);
        assert_eq!(read.score(), Some(7));

        let scores: Vec<i32> = read.iter_aln().map(AlignmentRecord::score).collect();
        assert_eq!(scores, vec![7, 3]);
        // a fresh iterator every call
        assert_eq!(read.iter_aln().len(), 2);
    }
}
