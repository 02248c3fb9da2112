//! Parser for FASTA files using noodles.
//!
//! Extracts contig names and lengths from FASTA files, optionally with the
//! MD5 of each sequence. Supports both uncompressed and gzip/bgzip
//! compressed files.

use std::ffi::OsStr;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::GzDecoder;
use noodles::fasta;

use crate::core::contig::Contig;
use crate::error::{Error, Result};
use crate::utils::validation::{check_contig_limit, sequence_md5};

/// Check if the path has a FASTA extension
pub fn is_fasta_file(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();

    if path_str.ends_with(".fa.gz")
        || path_str.ends_with(".fasta.gz")
        || path_str.ends_with(".fna.gz")
        || path_str.ends_with(".fa.bgz")
        || path_str.ends_with(".fasta.bgz")
        || path_str.ends_with(".fna.bgz")
    {
        return true;
    }

    matches!(
        path.extension()
            .and_then(OsStr::to_str)
            .map(str::to_lowercase)
            .as_deref(),
        Some("fa" | "fasta" | "fna")
    )
}

/// Check if the path is a gzipped file
#[allow(clippy::case_sensitive_file_extension_comparisons)] // Already lowercased
pub fn is_gzipped(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".bgz")
}

/// Open a possibly gzip-compressed file for buffered reading
pub(crate) fn open_maybe_gzipped(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = std::fs::File::open(path)?;
    if is_gzipped(path) {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Parse a FASTA file and extract its contigs.
///
/// This reads through the entire file to determine sequence lengths; when
/// `with_md5` is set the MD5 of each uppercase sequence is computed as well.
///
/// # Errors
///
/// Returns `Error::Io` if the file cannot be read, `Error::Format` if parsing
/// fails or no sequences are found, or `Error::InvalidArgument` if the contig
/// limit is exceeded.
pub fn parse_fasta_file(path: &Path, with_md5: bool) -> Result<Vec<Contig>> {
    let mut reader = fasta::io::Reader::new(open_maybe_gzipped(path)?);
    parse_fasta_reader(&mut reader, with_md5)
}

/// Parse from a noodles FASTA reader
pub fn parse_fasta_reader<R: BufRead>(
    reader: &mut fasta::io::Reader<R>,
    with_md5: bool,
) -> Result<Vec<Contig>> {
    let mut contigs = Vec::new();

    for result in reader.records() {
        let record =
            result.map_err(|e| Error::Format(format!("Failed to parse FASTA record: {e}")))?;

        // Check contig limit for DOS protection
        if let Some(msg) = check_contig_limit(contigs.len()) {
            return Err(Error::InvalidArgument(msg));
        }

        let name = String::from_utf8_lossy(record.name()).to_string();
        let sequence = record.sequence();
        let mut contig = Contig::new(name, sequence.len() as u64);

        if with_md5 {
            contig.md5 = Some(sequence_md5(sequence.as_ref()));
        }
        contigs.push(contig);
    }

    if contigs.is_empty() {
        return Err(Error::Format("No sequences found in FASTA file".to_string()));
    }

    Ok(contigs)
}
