//! # rapi
//!
//! A uniform interface to short-read aligners.
//!
//! An aligner is plugged in behind the [`AlignerPlugin`] trait. Around it this
//! crate provides the object model a caller works with: a loaded
//! [`ReferenceCatalog`], [`ReadBatch`]es of single or paired reads, and the
//! [`AlignmentRecord`]s the aligner attaches to each read. Results are
//! rendered as SAM, and two SAM files can be compared semantically to check an
//! aligner's output.
//!
//! ## Features
//!
//! - **Read batches**: fixed-stride fragments with bounds-checked access
//! - **Quality normalization**: Sanger and Illumina encodings, stored as Sanger
//! - **Alignment records**: CIGAR, flags, tags and insert size between mates
//! - **SAM output**: header and records for single and paired fragments
//! - **SAM comparison**: mandatory columns exactly, optional tags as a set
//!
//! ## Example
//!
//! ```rust,no_run
//! use rapi::plugin::load_aligner;
//! use rapi::sam::{format_sam_batch, format_sam_header};
//! use rapi::{QualityEncoding, ReadBatch};
//! use std::path::Path;
//!
//! let mut plugin = load_aligner("null").unwrap();
//! let options = plugin.load_options();
//! plugin.initialize(&options).unwrap();
//!
//! let reference = plugin.load_reference(Path::new("ref.fa")).unwrap();
//! let mut aligner = plugin.create_aligner(&options).unwrap();
//!
//! let mut batch = ReadBatch::new(2).unwrap();
//! batch.append("r1", "ACGTACGT", Some("IIIIIIII"), QualityEncoding::Sanger).unwrap();
//! batch.append("r1", "TTGCAAGC", Some("IIIIIIII"), QualityEncoding::Sanger).unwrap();
//! aligner.align(&reference, &mut batch).unwrap();
//!
//! println!("{}", format_sam_header(&reference));
//! println!("{}", format_sam_batch(&reference, &batch).unwrap());
//!
//! reference.unload();
//! plugin.shutdown().unwrap();
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Data model for references, reads, batches and alignments
//! - [`plugin`]: Aligner interface, options and plugin registry
//! - [`parsing`]: Readers for FASTA references and read files
//! - [`sam`]: SAM formatting and comparison
//! - [`cli`]: Command-line interface implementation

pub mod cli;
pub mod core;
pub mod error;
pub mod parsing;
pub mod plugin;
pub mod sam;
pub mod utils;

// Re-export commonly used types for convenience
pub use core::alignment::{insert_size, AlignmentFlags, AlignmentRecord};
pub use core::batch::{Fragment, ReadBatch};
pub use core::cigar::{Cigar, CigarKind, CigarOp};
pub use core::contig::Contig;
pub use core::quality::QualityEncoding;
pub use core::read::Read;
pub use core::reference::{ContigRef, ReferenceCatalog};
pub use core::tag::TagValue;
pub use error::{Error, ErrorKind, Result};
pub use plugin::{Aligner, AlignerOptions, AlignerPlugin, ParamValue};
