//! Core object model of the read aligner API.
//!
//! - [`Contig`] and [`ReferenceCatalog`]: metadata of a loaded reference
//! - [`ReadBatch`], [`Read`], [`Fragment`]: reads grouped into fragments
//! - [`AlignmentRecord`], [`Cigar`], [`TagValue`]: alignment results
//! - [`quality`]: base quality encoding normalization
//!
//! ## Coordinates
//!
//! Positions are 0-based everywhere in this module. They only become 1-based
//! when rendered as SAM text.
//!
//! [`Contig`]: contig::Contig
//! [`ReferenceCatalog`]: reference::ReferenceCatalog
//! [`ReadBatch`]: batch::ReadBatch
//! [`Read`]: read::Read
//! [`Fragment`]: batch::Fragment
//! [`AlignmentRecord`]: alignment::AlignmentRecord
//! [`Cigar`]: cigar::Cigar
//! [`TagValue`]: tag::TagValue

pub mod alignment;
pub mod batch;
pub mod cigar;
pub mod contig;
pub mod quality;
pub mod read;
pub mod reference;
pub mod tag;
