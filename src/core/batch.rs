//! Fixed-stride container of reads grouped into fragments.
//!
//! Reads are stored flat; fragment `f`, mate `m` lives at `f * stride + m`.
//! Only the tail fragment may be partially filled, and a fragment counts
//! towards [`ReadBatch::n_fragments`] once all its mate slots are set.

use tracing::trace;

use crate::core::alignment::AlignmentRecord;
use crate::core::quality::{self, QualityEncoding};
use crate::core::read::Read;
use crate::error::{Error, Result};
use crate::utils::validation::validate_sequence;

#[derive(Debug, Clone)]
pub struct ReadBatch {
    reads_per_fragment: usize,
    slots: Vec<Option<Read>>,
    filled: usize,
}

impl ReadBatch {
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` if `reads_per_fragment` is zero.
    pub fn new(reads_per_fragment: usize) -> Result<Self> {
        if reads_per_fragment < 1 {
            return Err(Error::invalid(
                "number of reads per fragment must be at least 1",
            ));
        }
        Ok(Self {
            reads_per_fragment,
            slots: Vec::new(),
            filled: 0,
        })
    }

    #[must_use]
    pub fn n_reads_per_fragment(&self) -> usize {
        self.reads_per_fragment
    }

    /// Number of reads stored, including those of a partial tail fragment
    #[must_use]
    pub fn len(&self) -> usize {
        self.filled
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filled == 0
    }

    /// Number of complete fragments
    #[must_use]
    pub fn n_fragments(&self) -> usize {
        self.filled / self.reads_per_fragment
    }

    /// Whether every stored fragment has all of its mates
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.filled % self.reads_per_fragment == 0
    }

    /// Number of reads that can be held without reallocating
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Grow capacity to at least `n_reads`. Never shrinks, never moves
    /// existing reads.
    ///
    /// # Errors
    ///
    /// Returns `Error::OutOfMemory` if the space cannot be allocated.
    pub fn reserve(&mut self, n_reads: usize) -> Result<()> {
        if n_reads > self.slots.capacity() {
            self.slots
                .try_reserve_exact(n_reads - self.slots.len())
                .map_err(|_| Error::OutOfMemory(n_reads))?;
        }
        Ok(())
    }

    /// Drop every read, keeping the allocated capacity
    pub fn clear(&mut self) {
        self.slots.clear();
        self.filled = 0;
    }

    /// Add a read to the next free mate slot of the tail fragment
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` for an empty id or sequence, a sequence
    /// with non-nucleotide characters or a quality of the wrong length, and
    /// `Error::QualityRange` for out-of-range quality bytes.
    pub fn append(
        &mut self,
        id: &str,
        sequence: &str,
        quality: Option<&str>,
        encoding: QualityEncoding,
    ) -> Result<()> {
        let read = build_read(id, sequence, quality, encoding)?;

        let tail = self.n_fragments() * self.reads_per_fragment;
        let slot = (tail..tail + self.reads_per_fragment)
            .find(|&i| self.slots.get(i).map_or(true, Option::is_none))
            .ok_or_else(|| Error::invalid("tail fragment has no free mate slot"))?;

        self.store(slot, read)
    }

    /// Add a whole fragment, one `(id, sequence, quality)` per mate.
    ///
    /// Every read is validated before any is stored, so on error the batch is
    /// left as it was.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` if `mates` does not hold one read per
    /// mate or the tail fragment is partially filled, plus the validation
    /// errors of [`ReadBatch::append`].
    pub fn append_fragment(
        &mut self,
        mates: &[(&str, &str, Option<&str>)],
        encoding: QualityEncoding,
    ) -> Result<()> {
        if mates.len() != self.reads_per_fragment {
            return Err(Error::invalid(format!(
                "fragment has {} reads, expected {}",
                mates.len(),
                self.reads_per_fragment
            )));
        }
        if !self.is_complete() {
            return Err(Error::invalid("tail fragment is partially filled"));
        }

        let reads = mates
            .iter()
            .map(|&(id, sequence, quality)| build_read(id, sequence, quality, encoding))
            .collect::<Result<Vec<_>>>()?;

        let start = self.n_fragments() * self.reads_per_fragment;
        let end = start + reads.len();
        if end > self.slots.len() {
            self.slots
                .try_reserve(end - self.slots.len())
                .map_err(|_| Error::OutOfMemory(end))?;
        }
        for (offset, read) in reads.into_iter().enumerate() {
            self.store(start + offset, read)?;
        }
        Ok(())
    }

    /// Write a read in place at `(fragment, mate)`.
    ///
    /// The fragment must be an existing one or the tail (the next fragment to
    /// be completed); later fragments cannot be skipped to.
    ///
    /// # Errors
    ///
    /// Returns `Error::Index` for a slot outside those bounds, plus the
    /// validation errors of [`ReadBatch::append`].
    pub fn set_read(
        &mut self,
        fragment: usize,
        mate: usize,
        id: &str,
        sequence: &str,
        quality: Option<&str>,
        encoding: QualityEncoding,
    ) -> Result<()> {
        self.check_mate(mate)?;
        let tail = self.n_fragments();
        if fragment > tail {
            return Err(Error::Index {
                what: "fragment",
                index: fragment,
                bound: tail + 1,
            });
        }

        let read = build_read(id, sequence, quality, encoding)?;
        self.store(fragment * self.reads_per_fragment + mate, read)
    }

    /// Bounds-checked access to a stored read
    ///
    /// # Errors
    ///
    /// Returns `Error::Index` if the fragment or mate index is out of range or
    /// the slot has not been filled.
    pub fn get_read(&self, fragment: usize, mate: usize) -> Result<&Read> {
        let touched = self.filled.div_ceil(self.reads_per_fragment);
        if fragment >= touched {
            return Err(Error::Index {
                what: "fragment",
                index: fragment,
                bound: touched,
            });
        }
        self.check_mate(mate)?;

        let flat = fragment * self.reads_per_fragment + mate;
        self.slots
            .get(flat)
            .and_then(Option::as_ref)
            .ok_or(Error::Index {
                what: "read",
                index: flat,
                bound: self.filled,
            })
    }

    /// Attach alignment results to the read at `(fragment, mate)`, replacing
    /// any previous ones. The paired flag of each record follows the batch.
    ///
    /// # Errors
    ///
    /// Returns `Error::Index` if there is no read in that slot.
    pub fn set_alignments(
        &mut self,
        fragment: usize,
        mate: usize,
        mut alignments: Vec<AlignmentRecord>,
    ) -> Result<()> {
        self.get_read(fragment, mate)?;
        let paired = self.reads_per_fragment > 1;
        for aln in &mut alignments {
            aln.set_paired(paired);
        }
        let flat = fragment * self.reads_per_fragment + mate;
        if let Some(Some(read)) = self.slots.get_mut(flat) {
            read.set_alignments(alignments);
        }
        Ok(())
    }

    /// The complete fragment at `index`
    ///
    /// # Errors
    ///
    /// Returns `Error::Index` if `index` is not in `[0, n_fragments)`.
    pub fn fragment(&self, index: usize) -> Result<Fragment<'_>> {
        let n = self.n_fragments();
        if index >= n {
            return Err(Error::Index {
                what: "fragment",
                index,
                bound: n,
            });
        }
        let start = index * self.reads_per_fragment;
        Ok(Fragment {
            index,
            slots: &self.slots[start..start + self.reads_per_fragment],
        })
    }

    /// Iterate over complete fragments in storage order
    pub fn fragments(&self) -> FragmentIter<'_> {
        FragmentIter {
            batch: self,
            next: 0,
            end: self.n_fragments(),
        }
    }

    fn check_mate(&self, mate: usize) -> Result<()> {
        if mate >= self.reads_per_fragment {
            return Err(Error::Index {
                what: "mate",
                index: mate,
                bound: self.reads_per_fragment,
            });
        }
        Ok(())
    }

    fn store(&mut self, flat: usize, read: Read) -> Result<()> {
        if flat >= self.slots.len() {
            let needed = flat + 1 - self.slots.len();
            self.slots
                .try_reserve(needed)
                .map_err(|_| Error::OutOfMemory(flat + 1))?;
            self.slots.resize_with(flat + 1, || None);
        }
        let slot = &mut self.slots[flat];
        if slot.is_none() {
            self.filled += 1;
        }
        trace!(slot = flat, id = read.id(), "Stored read");
        *slot = Some(read);
        Ok(())
    }
}

fn build_read(
    id: &str,
    sequence: &str,
    quality: Option<&str>,
    encoding: QualityEncoding,
) -> Result<Read> {
    if id.is_empty() {
        return Err(Error::invalid("read id must not be empty"));
    }
    if sequence.is_empty() {
        return Err(Error::invalid(format!("read '{id}' has an empty sequence")));
    }
    validate_sequence(sequence)?;

    let quality = quality::normalize(quality, encoding)?;
    if let Some(q) = &quality {
        if q.len() != sequence.len() {
            return Err(Error::invalid(format!(
                "read '{id}': quality length {} differs from sequence length {}",
                q.len(),
                sequence.len()
            )));
        }
    }

    Ok(Read::new(id.to_string(), sequence.to_string(), quality))
}

/// The reads of one complete fragment, in mate order
#[derive(Debug, Clone, Copy)]
pub struct Fragment<'a> {
    index: usize,
    slots: &'a [Option<Read>],
}

impl<'a> Fragment<'a> {
    /// Position of this fragment in its batch
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[must_use]
    pub fn get(&self, mate: usize) -> Option<&'a Read> {
        self.slots.get(mate).and_then(Option::as_ref)
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Read> + 'a {
        self.slots.iter().flatten()
    }
}

/// Iterator over the complete fragments of a batch
#[derive(Debug, Clone)]
pub struct FragmentIter<'a> {
    batch: &'a ReadBatch,
    next: usize,
    end: usize,
}

impl<'a> Iterator for FragmentIter<'a> {
    type Item = Fragment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let fragment = self.batch.fragment(self.next).ok()?;
        self.next += 1;
        Some(fragment)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.end - self.next;
        (n, Some(n))
    }
}

impl ExactSizeIterator for FragmentIter<'_> {}

impl<'a> IntoIterator for &'a ReadBatch {
    type Item = Fragment<'a>;
    type IntoIter = FragmentIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.fragments()
    }
}
