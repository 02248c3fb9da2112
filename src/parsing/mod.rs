//! Readers for the files the aligner consumes.
//!
//! This module provides parsers for:
//!
//! - **FASTA references**: contig names, lengths and optional MD5 ([`fasta`])
//! - **FASTA index (.fai) files**: names and lengths without scanning ([`fai`])
//! - **Picard .dict files**: `AS`/`M5`/`SP`/`UR` metadata ([`dict`])
//! - **Read inputs**: prq, FASTQ pairs and interleaved FASTQ ([`reads`])
//!
//! [`reference::load_reference`] combines the first three into a
//! [`ReferenceCatalog`](crate::core::reference::ReferenceCatalog).
//!
//! ## Example
//!
//! ```rust,no_run
//! use rapi::parsing::reads::{FragmentReader, PrqReader};
//! use rapi::parsing::reference::load_reference;
//! use rapi::{QualityEncoding, ReadBatch};
//! use std::path::Path;
//!
//! let catalog = load_reference(Path::new("ref.fa"), false).unwrap();
//!
//! let mut reader = PrqReader::from_path(Path::new("reads.prq"), 2, QualityEncoding::Sanger).unwrap();
//! let mut batch = ReadBatch::new(2).unwrap();
//! let n = reader.read_fragments(&mut batch, 1000).unwrap();
//! println!("{n} fragments against {} contigs", catalog.len());
//! ```

pub mod dict;
pub mod fai;
pub mod fasta;
pub mod reads;
pub mod reference;
