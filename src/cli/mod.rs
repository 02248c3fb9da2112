//! Command-line interface for rapi.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **align**: Align reads against a reference and write SAM
//! - **compare**: Compare two SAM files, ignoring optional tag order
//! - **ref**: List the contigs of a reference
//! - **info**: Show the name and versions of an aligner plugin
//!
//! ## Usage
//!
//! ```text
//! # Align paired reads from a prq file
//! rapi align ref.fa reads.prq -o out.sam
//!
//! # Align a FASTQ pair
//! rapi align ref.fa r1.fq.gz r2.fq.gz --input-format fastq
//!
//! # Check output against an expected file
//! rapi compare out.sam expected.sam
//!
//! # JSON listing of a reference
//! rapi ref ref.fa --format json
//! ```

use clap::{Parser, Subcommand};

pub mod align;
pub mod compare;
pub mod info;
pub mod reference;

#[derive(Parser)]
#[command(name = "rapi")]
#[command(version)]
#[command(about = "Align reads through a pluggable aligner and work with its SAM output")]
#[command(
    long_about = "rapi drives a short-read aligner plugin through a uniform interface.\n\nIt loads a reference, feeds reads to the aligner in batches and writes the results as SAM. It can also compare two SAM files record by record, treating optional tags as an unordered set."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Align reads and write SAM
    Align(align::AlignArgs),

    /// Compare two SAM files
    Compare(compare::CompareArgs),

    /// List the contigs of a reference
    Ref(reference::RefArgs),

    /// Show aligner plugin information
    Info(info::InfoArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}
