//! Centralized validation and helper functions.

use crate::error::{Error, Result};

/// Maximum number of contigs allowed in a single reference (DOS protection)
pub const MAX_CONTIGS: usize = 100_000;

/// Validate that a string is a valid MD5 checksum (32 hex characters).
///
/// # Examples
///
/// ```
/// use rapi::utils::validation::is_valid_md5;
///
/// assert!(is_valid_md5("6aef897c3d6ff0c78aff06ac189178dd"));
/// assert!(!is_valid_md5("not-an-md5"));
/// assert!(!is_valid_md5("6aef897c3d6ff0c78aff06ac189178d")); // 31 chars
/// ```
#[must_use]
pub fn is_valid_md5(s: &str) -> bool {
    s.len() == 32 && s.chars().all(|c| c.is_ascii_hexdigit())
}

/// Normalize an MD5 string to lowercase.
/// Returns None if the input is not a valid MD5.
#[must_use]
pub fn normalize_md5(s: &str) -> Option<String> {
    if is_valid_md5(s) {
        Some(s.to_lowercase())
    } else {
        None
    }
}

/// MD5 of the uppercase sequence, the convention used for `M5` header tags
#[must_use]
pub fn sequence_md5(sequence: &[u8]) -> String {
    let uppercase: Vec<u8> = sequence.iter().map(u8::to_ascii_uppercase).collect();
    format!("{:x}", md5::compute(&uppercase))
}

/// Check if adding another contig would exceed the maximum allowed.
///
/// Call this with the current count BEFORE adding a new contig.
/// Returns an error message if adding would exceed the limit, None if safe to add.
#[must_use]
pub fn check_contig_limit(count: usize) -> Option<String> {
    if count >= MAX_CONTIGS {
        Some(format!(
            "Too many contigs: adding another would exceed maximum of {MAX_CONTIGS}"
        ))
    } else {
        None
    }
}

/// Whether `base` is one of `ACGTN`, in either case
#[must_use]
pub fn is_nucleotide(base: u8) -> bool {
    matches!(base.to_ascii_uppercase(), b'A' | b'C' | b'G' | b'T' | b'N')
}

/// Check that every base of a read sequence is a nucleotide
///
/// # Errors
///
/// Returns `Error::InvalidArgument` naming the first invalid base.
pub fn validate_sequence(sequence: &str) -> Result<()> {
    match sequence.bytes().position(|b| !is_nucleotide(b)) {
        None => Ok(()),
        Some(i) => Err(Error::invalid(format!(
            "invalid base '{}' at position {i}",
            sequence[i..].chars().next().unwrap_or('?')
        ))),
    }
}

/// Reverse complement of a nucleotide sequence; case is preserved
#[must_use]
pub fn reverse_complement(sequence: &str) -> String {
    sequence
        .bytes()
        .rev()
        .map(|b| {
            char::from(match b {
                b'A' => b'T',
                b'C' => b'G',
                b'G' => b'C',
                b'T' => b'A',
                b'a' => b't',
                b'c' => b'g',
                b'g' => b'c',
                b't' => b'a',
                b'n' => b'n',
                _ => b'N',
            })
        })
        .collect()
}
