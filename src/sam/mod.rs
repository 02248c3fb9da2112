//! SAM text output and SAM comparison.
//!
//! - [`format`]: header and record rendering for aligned batches
//! - [`compare`]: order-insensitive comparison of two SAM streams, used to
//!   check aligner output against an expected file

pub mod compare;
pub mod format;

pub use compare::{ComparisonReport, Mismatch, SamComparator};
pub use format::{
    format_sam, format_sam_batch, format_sam_fragment, format_sam_header,
    format_sam_header_with_metadata, format_sam_header_with_program,
};
