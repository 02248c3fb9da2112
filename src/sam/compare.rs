//! Semantic comparison of two SAM streams.
//!
//! Two files are equal when:
//!
//! - their `@HD` and `@SQ` header lines are identical and in the same order
//!   (other header types are ignored)
//! - every pair of records, walked in lockstep, has identical mandatory
//!   columns and the same *set* of optional tags
//! - both files hold the same number of records
//!
//! Differences are collected into a [`ComparisonReport`] rather than raised
//! as errors; only unreadable input is an error.

use std::collections::BTreeSet;
use std::fmt;
use std::io::BufRead;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::parsing::fasta::open_maybe_gzipped;

/// Number of mandatory SAM columns
pub const MANDATORY_COLUMNS: usize = 11;

/// Header record types that take part in the comparison
const COMPARED_HEADER_TYPES: [&str; 2] = ["HD", "SQ"];

/// One difference between two SAM streams
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Mismatch {
    /// Different number of `@HD`/`@SQ` lines
    HeaderCount { a: usize, b: usize },

    /// The `index`-th compared header line differs
    HeaderLine { index: usize, a: String, b: String },

    /// Mandatory columns of the `line`-th record differ
    Fields { line: usize, a: String, b: String },

    /// Tag sets of the `line`-th record differ
    Tags {
        line: usize,
        qname_a: String,
        qname_b: String,
        tags_a: Vec<String>,
        tags_b: Vec<String>,
    },

    /// One stream ran out of records before the other
    Length { a_done: bool, b_done: bool },
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HeaderCount { a, b } => {
                write!(f, "lengths of headers are different ({a} vs. {b})")
            }
            Self::HeaderLine { index, a, b } => {
                write!(f, "header line {index} differs:\n\t{a}\nvs\n\t{b}")
            }
            Self::Fields { line, a, b } => {
                write!(f, "record {line}: alignments differ:\n\t'{a}'\nand\n\t'{b}'")
            }
            Self::Tags {
                line,
                qname_a,
                qname_b,
                tags_a,
                tags_b,
            } => write!(
                f,
                "record {line}: alignment tags differ for {qname_a} and {qname_b} -> {{ {} }} != {{ {} }}",
                tags_a.join(","),
                tags_b.join(",")
            ),
            Self::Length { a_done, b_done } => write!(
                f,
                "finished reading one SAM before the other (a is {}done; b is {}done)",
                if *a_done { "" } else { "NOT " },
                if *b_done { "" } else { "NOT " }
            ),
        }
    }
}

/// Outcome of a comparison
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComparisonReport {
    pub headers_equal: bool,
    pub records_compared: usize,
    pub mismatches: Vec<Mismatch>,
}

impl ComparisonReport {
    #[must_use]
    pub fn is_equal(&self) -> bool {
        self.headers_equal && self.mismatches.is_empty()
    }
}

/// Header line split into its type and tag fields
#[derive(Debug, Clone, PartialEq, Eq)]
struct HeaderLine {
    record_type: String,
    tags: Vec<String>,
    text: String,
}

impl HeaderLine {
    fn parse(line: &str) -> Self {
        let mut items = line[1..].split('\t');
        let record_type = items.next().unwrap_or_default().to_string();
        Self {
            record_type,
            tags: items.map(str::to_string).collect(),
            text: line.to_string(),
        }
    }

    fn is_compared(&self) -> bool {
        COMPARED_HEADER_TYPES.contains(&self.record_type.as_str())
    }
}

/// A record split into its mandatory columns and its tag set
struct RecordParts<'a> {
    mandatory: &'a str,
    tags: BTreeSet<&'a str>,
}

impl<'a> RecordParts<'a> {
    fn parse(line: &'a str, line_number: usize) -> Result<Self> {
        // Byte offset of the tab that ends the mandatory columns, if any
        let split = line
            .match_indices('\t')
            .nth(MANDATORY_COLUMNS - 1)
            .map(|(i, _)| i);

        let (mandatory, rest) = match split {
            Some(i) => (&line[..i], &line[i + 1..]),
            None => (line, ""),
        };

        let columns = mandatory.split('\t').count();
        if columns < MANDATORY_COLUMNS {
            return Err(Error::Format(format!(
                "SAM line {line_number} has {columns} columns, expected at least {MANDATORY_COLUMNS}"
            )));
        }

        Ok(Self {
            mandatory,
            tags: rest.split('\t').filter(|t| !t.is_empty()).collect(),
        })
    }

    fn qname(&self) -> &'a str {
        self.mandatory.split('\t').next().unwrap_or_default()
    }
}

/// Line reader with one line of lookahead
struct SamLines<R> {
    inner: R,
    current: Option<String>,
    line_number: usize,
}

impl<R: BufRead> SamLines<R> {
    fn new(inner: R) -> Result<Self> {
        let mut lines = Self {
            inner,
            current: None,
            line_number: 0,
        };
        lines.advance()?;
        Ok(lines)
    }

    /// Move to the next non-blank line
    fn advance(&mut self) -> Result<()> {
        let mut buf = String::new();
        loop {
            buf.clear();
            if self.inner.read_line(&mut buf)? == 0 {
                self.current = None;
                return Ok(());
            }
            self.line_number += 1;
            let trimmed = buf.trim_end_matches(['\n', '\r']).len();
            buf.truncate(trimmed);
            if !buf.is_empty() {
                self.current = Some(buf);
                return Ok(());
            }
        }
    }

    fn is_done(&self) -> bool {
        self.current.is_none()
    }

    fn read_header(&mut self) -> Result<Vec<HeaderLine>> {
        let mut header = Vec::new();
        while let Some(line) = self.current.as_deref().filter(|l| l.starts_with('@')) {
            header.push(HeaderLine::parse(line));
            self.advance()?;
        }
        Ok(header)
    }
}

/// Compares SAM streams record by record
#[derive(Debug, Clone, Copy, Default)]
pub struct SamComparator;

impl SamComparator {
    /// Compare two SAM files, either of which may be gzip-compressed
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if a file cannot be read and `Error::Format` for a
    /// record with fewer than 11 columns.
    pub fn compare_files(a: &Path, b: &Path) -> Result<ComparisonReport> {
        let report = Self::compare(open_maybe_gzipped(a)?, open_maybe_gzipped(b)?)?;
        info!(
            a = %a.display(),
            b = %b.display(),
            equal = report.is_equal(),
            records = report.records_compared,
            "Compared SAM files"
        );
        Ok(report)
    }

    /// Compare two SAM streams
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if a stream cannot be read and `Error::Format` for
    /// a record with fewer than 11 columns.
    pub fn compare<A: BufRead, B: BufRead>(a: A, b: B) -> Result<ComparisonReport> {
        let mut a = SamLines::new(a)?;
        let mut b = SamLines::new(b)?;
        let mut report = ComparisonReport::default();

        let header_a = a.read_header()?;
        let header_b = b.read_header()?;
        compare_headers(&header_a, &header_b, &mut report.mismatches);
        report.headers_equal = report.mismatches.is_empty();

        while let (Some(line_a), Some(line_b)) = (a.current.as_deref(), b.current.as_deref()) {
            report.records_compared += 1;
            let record = report.records_compared;
            let parts_a = RecordParts::parse(line_a, a.line_number)?;
            let parts_b = RecordParts::parse(line_b, b.line_number)?;

            if parts_a.mandatory != parts_b.mandatory {
                report.mismatches.push(Mismatch::Fields {
                    line: record,
                    a: parts_a.mandatory.to_string(),
                    b: parts_b.mandatory.to_string(),
                });
            } else if parts_a.tags != parts_b.tags {
                report.mismatches.push(Mismatch::Tags {
                    line: record,
                    qname_a: parts_a.qname().to_string(),
                    qname_b: parts_b.qname().to_string(),
                    tags_a: parts_a.tags.iter().map(|t| (*t).to_string()).collect(),
                    tags_b: parts_b.tags.iter().map(|t| (*t).to_string()).collect(),
                });
            }

            a.advance()?;
            b.advance()?;
        }

        if a.is_done() != b.is_done() {
            report.mismatches.push(Mismatch::Length {
                a_done: a.is_done(),
                b_done: b.is_done(),
            });
        }

        for mismatch in &report.mismatches {
            debug!(%mismatch, "SAM mismatch");
        }
        Ok(report)
    }
}

fn compare_headers(a: &[HeaderLine], b: &[HeaderLine], mismatches: &mut Vec<Mismatch>) {
    let a: Vec<&HeaderLine> = a.iter().filter(|h| h.is_compared()).collect();
    let b: Vec<&HeaderLine> = b.iter().filter(|h| h.is_compared()).collect();

    if a.len() != b.len() {
        mismatches.push(Mismatch::HeaderCount {
            a: a.len(),
            b: b.len(),
        });
        return;
    }

    for (index, (ha, hb)) in a.iter().zip(&b).enumerate() {
        if (&ha.record_type, &ha.tags) != (&hb.record_type, &hb.tags) {
            mismatches.push(Mismatch::HeaderLine {
                index,
                a: ha.text.clone(),
                b: hb.text.clone(),
            });
        }
    }
}
