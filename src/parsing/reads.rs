//! Readers that fill a [`ReadBatch`] from sequencing read files.
//!
//! Three layouts are supported:
//!
//! - **prq**: one fragment per line, `ID\tSEQ1\tQUAL1[\tSEQ2\tQUAL2]`
//! - **FASTQ pair**: two files read in lockstep, one mate from each
//! - **FASTQ**: a single file, either single-end or with mates interleaved
//!
//! Every reader fills a batch with at most a given number of fragments per
//! call and reports how many it read, so that callers can process inputs of
//! any size in chunks.

use std::io::BufRead;
use std::path::Path;

use noodles::fastq;
use tracing::debug;

use crate::core::batch::ReadBatch;
use crate::core::quality::QualityEncoding;
use crate::error::{Error, Result};
use crate::parsing::fasta::open_maybe_gzipped;

/// A source of fragments
pub trait FragmentReader {
    /// Number of reads in each fragment produced by this reader
    fn reads_per_fragment(&self) -> usize;

    /// Append up to `max_fragments` fragments to `batch`.
    ///
    /// Returns the number of fragments appended; 0 means the input is exhausted.
    ///
    /// # Errors
    ///
    /// Returns `Error::Format` for malformed input and the validation errors
    /// of [`ReadBatch::append`] for invalid reads.
    fn read_fragments(&mut self, batch: &mut ReadBatch, max_fragments: usize) -> Result<usize>;
}

fn check_stride(reader_stride: usize, batch: &ReadBatch) -> Result<()> {
    if batch.n_reads_per_fragment() == reader_stride {
        Ok(())
    } else {
        Err(Error::invalid(format!(
            "input has {reader_stride} reads per fragment but the batch holds {}",
            batch.n_reads_per_fragment()
        )))
    }
}

/// Reader for the tab-separated `prq` format
pub struct PrqReader<R> {
    inner: R,
    reads_per_fragment: usize,
    encoding: QualityEncoding,
    line_number: usize,
    line: String,
}

impl PrqReader<Box<dyn BufRead>> {
    /// Open a prq file, gzip-compressed or not
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be opened.
    pub fn from_path(
        path: &Path,
        reads_per_fragment: usize,
        encoding: QualityEncoding,
    ) -> Result<Self> {
        Self::new(open_maybe_gzipped(path)?, reads_per_fragment, encoding)
    }
}

impl<R: BufRead> PrqReader<R> {
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` unless `reads_per_fragment` is 1 or 2.
    pub fn new(inner: R, reads_per_fragment: usize, encoding: QualityEncoding) -> Result<Self> {
        if !(1..=2).contains(&reads_per_fragment) {
            return Err(Error::invalid(format!(
                "prq holds 1 or 2 reads per fragment, not {reads_per_fragment}"
            )));
        }
        Ok(Self {
            inner,
            reads_per_fragment,
            encoding,
            line_number: 0,
            line: String::new(),
        })
    }
}

impl<R: BufRead> FragmentReader for PrqReader<R> {
    fn reads_per_fragment(&self) -> usize {
        self.reads_per_fragment
    }

    fn read_fragments(&mut self, batch: &mut ReadBatch, max_fragments: usize) -> Result<usize> {
        check_stride(self.reads_per_fragment, batch)?;
        let expected_columns = 1 + 2 * self.reads_per_fragment;
        let mut n = 0;

        while n < max_fragments {
            self.line.clear();
            if self.inner.read_line(&mut self.line)? == 0 {
                break;
            }
            self.line_number += 1;

            let line = self.line.trim_end_matches(['\n', '\r']);
            if line.is_empty() {
                continue;
            }

            let row: Vec<&str> = line.split('\t').collect();
            if row.len() != expected_columns {
                return Err(Error::Format(format!(
                    "prq line {} has {} columns, expected {expected_columns}",
                    self.line_number,
                    row.len()
                )));
            }

            let mates: Vec<(&str, &str, Option<&str>)> = (0..self.reads_per_fragment)
                .map(|mate| (row[0], row[1 + 2 * mate], Some(row[2 + 2 * mate])))
                .collect();
            batch.append_fragment(&mates, self.encoding)?;
            n += 1;
        }

        debug!(fragments = n, "Read prq fragments");
        Ok(n)
    }
}

/// Read one FASTQ record; `Ok(false)` at end of input
fn next_record<R: BufRead>(
    reader: &mut fastq::io::Reader<R>,
    record: &mut fastq::Record,
) -> Result<bool> {
    match reader.read_record(record) {
        Ok(0) => Ok(false),
        Ok(_) => Ok(true),
        Err(e) => Err(Error::from_record_io(e)),
    }
}

/// Read name without a trailing `/1` or `/2` mate marker
fn fragment_name(name: &str) -> &str {
    name.strip_suffix("/1")
        .or_else(|| name.strip_suffix("/2"))
        .unwrap_or(name)
}

/// Append one fragment made of `records`, one record per mate
fn append_records(
    batch: &mut ReadBatch,
    records: &[fastq::Record],
    encoding: QualityEncoding,
) -> Result<()> {
    let fields: Vec<_> = records
        .iter()
        .map(|record| {
            (
                String::from_utf8_lossy(record.name()),
                String::from_utf8_lossy(record.sequence()),
                String::from_utf8_lossy(record.quality_scores()),
            )
        })
        .collect();
    let mates: Vec<(&str, &str, Option<&str>)> = fields
        .iter()
        .map(|(id, seq, qual)| {
            let qual = (!qual.is_empty()).then_some(qual.as_ref());
            (fragment_name(id), seq.as_ref(), qual)
        })
        .collect();
    batch.append_fragment(&mates, encoding)
}

/// Reader for a single FASTQ stream, single-end or interleaved
pub struct FastqReader<R> {
    inner: fastq::io::Reader<R>,
    reads_per_fragment: usize,
    encoding: QualityEncoding,
    records: Vec<fastq::Record>,
}

impl FastqReader<Box<dyn BufRead>> {
    /// Open a FASTQ file, gzip-compressed or not
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be opened.
    pub fn from_path(path: &Path, interleaved: bool, encoding: QualityEncoding) -> Result<Self> {
        Ok(Self::new(open_maybe_gzipped(path)?, interleaved, encoding))
    }
}

impl<R: BufRead> FastqReader<R> {
    pub fn new(inner: R, interleaved: bool, encoding: QualityEncoding) -> Self {
        let reads_per_fragment = if interleaved { 2 } else { 1 };
        Self {
            inner: fastq::io::Reader::new(inner),
            reads_per_fragment,
            encoding,
            records: vec![fastq::Record::default(); reads_per_fragment],
        }
    }
}

impl<R: BufRead> FragmentReader for FastqReader<R> {
    fn reads_per_fragment(&self) -> usize {
        self.reads_per_fragment
    }

    fn read_fragments(&mut self, batch: &mut ReadBatch, max_fragments: usize) -> Result<usize> {
        check_stride(self.reads_per_fragment, batch)?;
        let mut n = 0;

        'fragments: while n < max_fragments {
            for (mate, record) in self.records.iter_mut().enumerate() {
                if !next_record(&mut self.inner, record)? {
                    if mate == 0 {
                        break 'fragments;
                    }
                    return Err(Error::Format(
                        "interleaved FASTQ ends with an unpaired read".to_string(),
                    ));
                }
            }
            append_records(batch, &self.records, self.encoding)?;
            n += 1;
        }

        debug!(fragments = n, "Read FASTQ fragments");
        Ok(n)
    }
}

/// Reader for a pair of FASTQ streams holding mate 1 and mate 2
pub struct FastqPairReader<R1, R2> {
    first: fastq::io::Reader<R1>,
    second: fastq::io::Reader<R2>,
    encoding: QualityEncoding,
    records: [fastq::Record; 2],
}

impl FastqPairReader<Box<dyn BufRead>, Box<dyn BufRead>> {
    /// Open a pair of FASTQ files, gzip-compressed or not
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if either file cannot be opened.
    pub fn from_paths(first: &Path, second: &Path, encoding: QualityEncoding) -> Result<Self> {
        Ok(Self::new(
            open_maybe_gzipped(first)?,
            open_maybe_gzipped(second)?,
            encoding,
        ))
    }
}

impl<R1: BufRead, R2: BufRead> FastqPairReader<R1, R2> {
    pub fn new(first: R1, second: R2, encoding: QualityEncoding) -> Self {
        Self {
            first: fastq::io::Reader::new(first),
            second: fastq::io::Reader::new(second),
            encoding,
            records: Default::default(),
        }
    }
}

impl<R1: BufRead, R2: BufRead> FragmentReader for FastqPairReader<R1, R2> {
    fn reads_per_fragment(&self) -> usize {
        2
    }

    fn read_fragments(&mut self, batch: &mut ReadBatch, max_fragments: usize) -> Result<usize> {
        check_stride(2, batch)?;
        let mut n = 0;

        while n < max_fragments {
            let has_first = next_record(&mut self.first, &mut self.records[0])?;
            let has_second = next_record(&mut self.second, &mut self.records[1])?;
            match (has_first, has_second) {
                (true, true) => append_records(batch, &self.records, self.encoding)?,
                (false, false) => break,
                _ => {
                    return Err(Error::Format(
                        "FASTQ pair files have different numbers of records".to_string(),
                    ))
                }
            }
            n += 1;
        }

        debug!(fragments = n, "Read FASTQ pair fragments");
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::io::Cursor;

    #[test]
    fn test_prq_paired() {
        let input = "r1\tACGT\tEEEE\tTTTT\tFFFF\nr2\tGG\tII\tCC\t##\n";
        let mut reader = PrqReader::new(Cursor::new(input), 2, QualityEncoding::Sanger).unwrap();
        let mut batch = ReadBatch::new(2).unwrap();

        assert_eq!(reader.read_fragments(&mut batch, 10).unwrap(), 2);
        assert_eq!(batch.n_fragments(), 2);
        let mate = batch.get_read(1, 1).unwrap();
        assert_eq!(mate.id(), "r2");
        assert_eq!(mate.seq(), "CC");
        assert_eq!(mate.qual(), Some("##"));

        assert_eq!(reader.read_fragments(&mut batch, 10).unwrap(), 0);
    }

    #[test]
    fn test_prq_chunks() {
        let input = "a\tA\tE\nb\tC\tE\nc\tG\tE\n";
        let mut reader = PrqReader::new(Cursor::new(input), 1, QualityEncoding::Sanger).unwrap();
        let mut batch = ReadBatch::new(1).unwrap();

        assert_eq!(reader.read_fragments(&mut batch, 2).unwrap(), 2);
        batch.clear();
        assert_eq!(reader.read_fragments(&mut batch, 2).unwrap(), 1);
        assert_eq!(batch.get_read(0, 0).unwrap().id(), "c");
    }

    #[test]
    fn test_prq_wrong_column_count() {
        let input = "r1\tACGT\tEEEE\n";
        let mut reader = PrqReader::new(Cursor::new(input), 2, QualityEncoding::Sanger).unwrap();
        let mut batch = ReadBatch::new(2).unwrap();
        let err = reader.read_fragments(&mut batch, 10).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn test_prq_illumina() {
        let input = "r1\tAC\thh\n";
        let mut reader =
            PrqReader::new(Cursor::new(input), 1, QualityEncoding::Illumina).unwrap();
        let mut batch = ReadBatch::new(1).unwrap();
        reader.read_fragments(&mut batch, 1).unwrap();
        assert_eq!(batch.get_read(0, 0).unwrap().qual(), Some("II"));
    }

    #[test]
    fn test_stride_mismatch() {
        let mut reader =
            PrqReader::new(Cursor::new("r\tA\tE\n"), 1, QualityEncoding::Sanger).unwrap();
        let mut batch = ReadBatch::new(2).unwrap();
        let err = reader.read_fragments(&mut batch, 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_fastq_interleaved() {
        let input = "@p1/1\nACGT\n+\nEEEE\n@p1/2\nTTGG\n+\nFFFF\n";
        let mut reader = FastqReader::new(Cursor::new(input), true, QualityEncoding::Sanger);
        let mut batch = ReadBatch::new(2).unwrap();

        assert_eq!(reader.read_fragments(&mut batch, 5).unwrap(), 1);
        assert_eq!(batch.get_read(0, 0).unwrap().id(), "p1");
        assert_eq!(batch.get_read(0, 1).unwrap().id(), "p1");
        assert_eq!(batch.get_read(0, 1).unwrap().seq(), "TTGG");
    }

    #[test]
    fn test_fragment_name() {
        assert_eq!(fragment_name("p1/1"), "p1");
        assert_eq!(fragment_name("p1/2"), "p1");
        assert_eq!(fragment_name("p1/3"), "p1/3");
        assert_eq!(fragment_name("p1"), "p1");
        assert_eq!(fragment_name("a/1/2"), "a/1");
    }

    #[test]
    fn test_prq_bad_mate_leaves_no_partial_fragment() {
        let input = "r1	ACGT	EEEE	ACGT	EE
r2	GGCC	IIII	TTAA	IIII
";
        let mut reader = PrqReader::new(Cursor::new(input), 2, QualityEncoding::Sanger).unwrap();
        let mut batch = ReadBatch::new(2).unwrap();

        let err = reader.read_fragments(&mut batch, 10).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(batch.len(), 0);
        assert!(batch.is_complete());

        assert_eq!(reader.read_fragments(&mut batch, 10).unwrap(), 1);
        assert_eq!(batch.get_read(0, 0).unwrap().id(), "r2");
        assert_eq!(batch.get_read(0, 1).unwrap().seq(), "TTAA");
    }

    #[test]
    fn test_fastq_interleaved_bad_mate_leaves_no_partial_fragment() {
        let input = "@p1/1\nACGT\n+\nEEEE\n@p1/2\nAXGT\n+\nEEEE\n";
        let mut reader = FastqReader::new(Cursor::new(input), true, QualityEncoding::Sanger);
        let mut batch = ReadBatch::new(2).unwrap();

        assert!(reader.read_fragments(&mut batch, 5).is_err());
        assert_eq!(batch.len(), 0);
    }

    #[test]
    fn test_fastq_pair_strips_mate_suffix() {
        let r1 = "@frag/1\nAC\n+\nEE\n";
        let r2 = "@frag/2\nTT\n+\nFF\n";
        let mut reader =
            FastqPairReader::new(Cursor::new(r1), Cursor::new(r2), QualityEncoding::Sanger);
        let mut batch = ReadBatch::new(2).unwrap();

        assert_eq!(reader.read_fragments(&mut batch, 10).unwrap(), 1);
        assert_eq!(batch.get_read(0, 0).unwrap().id(), "frag");
        assert_eq!(batch.get_read(0, 1).unwrap().id(), "frag");
    }

    #[test]
    fn test_fastq_pair_bad_mate_leaves_no_partial_fragment() {
        let r1 = "@a\nAC\n+\nEE\n@b\nGG\n+\nEE\n";
        let r2 = "@a\nTT\n+\nF\n@b\nCC\n+\nFF\n";
        let mut reader =
            FastqPairReader::new(Cursor::new(r1), Cursor::new(r2), QualityEncoding::Sanger);
        let mut batch = ReadBatch::new(2).unwrap();

        assert!(reader.read_fragments(&mut batch, 10).is_err());
        assert_eq!(batch.len(), 0);
        assert_eq!(reader.read_fragments(&mut batch, 10).unwrap(), 1);
        assert_eq!(batch.get_read(0, 1).unwrap().seq(), "CC");
    }

    #[test]
    fn test_fastq_interleaved_odd_count() {
        let input = "@p1/1\nACGT\n+\nEEEE\n";
        let mut reader = FastqReader::new(Cursor::new(input), true, QualityEncoding::Sanger);
        let mut batch = ReadBatch::new(2).unwrap();
        let err = reader.read_fragments(&mut batch, 5).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn test_fastq_missing_separator() {
        let input = "@r1\nACGT\nEEEE\n";
        let mut reader = FastqReader::new(Cursor::new(input), false, QualityEncoding::Sanger);
        let mut batch = ReadBatch::new(1).unwrap();
        let err = reader.read_fragments(&mut batch, 5).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn test_fastq_pair() {
        let r1 = "@a\nAC\n+\nEE\n@b\nGG\n+\nEE\n";
        let r2 = "@a\nTT\n+\nFF\n@b\nCC\n+\nFF\n";
        let mut reader =
            FastqPairReader::new(Cursor::new(r1), Cursor::new(r2), QualityEncoding::Sanger);
        let mut batch = ReadBatch::new(2).unwrap();

        assert_eq!(reader.read_fragments(&mut batch, 10).unwrap(), 2);
        assert_eq!(batch.get_read(1, 0).unwrap().seq(), "GG");
        assert_eq!(batch.get_read(1, 1).unwrap().seq(), "CC");
    }

    #[test]
    fn test_fastq_pair_unequal_length() {
        let r1 = "@a\nAC\n+\nEE\n@b\nGG\n+\nEE\n";
        let r2 = "@a\nTT\n+\nFF\n";
        let mut reader =
            FastqPairReader::new(Cursor::new(r1), Cursor::new(r2), QualityEncoding::Sanger);
        let mut batch = ReadBatch::new(2).unwrap();
        let err = reader.read_fragments(&mut batch, 10).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }
}
