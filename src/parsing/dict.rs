//! Parser for Picard sequence dictionary (.dict) files.
//!
//! A dictionary is a SAM header holding `@HD` and `@SQ` lines. It is the only
//! place where a plain FASTA reference can carry `AS`, `M5`, `SP` and `UR`
//! metadata.

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::core::contig::Contig;
use crate::error::{Error, Result};
use crate::utils::validation::{check_contig_limit, normalize_md5};

/// Dictionary paths that may accompany a FASTA file, most specific first.
///
/// For `ref.fa.gz` these are `ref.fa.gz.dict`, `ref.fa.dict` and `ref.dict`.
#[must_use]
pub fn sibling_dict_paths(fasta_path: &Path) -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    let mut full = fasta_path.as_os_str().to_owned();
    full.push(".dict");
    candidates.push(PathBuf::from(full));

    let mut stem_path = fasta_path.to_path_buf();
    if stem_path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz") || ext.eq_ignore_ascii_case("bgz"))
    {
        stem_path.set_extension("");
        let mut inner = stem_path.as_os_str().to_owned();
        inner.push(".dict");
        candidates.push(PathBuf::from(inner));
    }
    candidates.push(stem_path.with_extension("dict"));

    candidates.dedup();
    candidates
}

/// Parse a Picard sequence dictionary (.dict) file
///
/// # Errors
///
/// Returns `Error::Io` if the file cannot be read, or other parse errors
/// if the content is invalid.
pub fn parse_dict_file(path: &Path) -> Result<Vec<Contig>> {
    let content = std::fs::read_to_string(path)?;
    parse_dict_text(&content)
}

/// Parse dictionary from text
///
/// `@SQ` lines without both `SN` and a numeric `LN` are skipped. An invalid
/// `M5` value is dropped with a warning.
///
/// # Errors
///
/// Returns `Error::Format` if no `@SQ` line is usable, or
/// `Error::InvalidArgument` if the number of contigs exceeds the maximum.
pub fn parse_dict_text(text: &str) -> Result<Vec<Contig>> {
    let mut contigs = Vec::new();

    for line in text.lines() {
        if !line.starts_with("@SQ") {
            continue;
        }

        let mut name: Option<&str> = None;
        let mut length: Option<u64> = None;
        let mut md5_raw: Option<&str> = None;
        let mut assembly: Option<&str> = None;
        let mut uri: Option<&str> = None;
        let mut species: Option<&str> = None;

        for field in line.split('\t').skip(1) {
            if let Some((tag, value)) = field.split_once(':') {
                match tag {
                    "SN" => name = Some(value),
                    "LN" => length = value.parse().ok(),
                    "M5" => md5_raw = Some(value),
                    "AS" => assembly = Some(value),
                    "UR" => uri = Some(value),
                    "SP" => species = Some(value),
                    _ => {}
                }
            }
        }

        let (Some(name), Some(length)) = (name, length) else {
            continue;
        };

        if let Some(msg) = check_contig_limit(contigs.len()) {
            return Err(Error::InvalidArgument(msg));
        }

        let mut contig = Contig::new(name, length);
        contig.md5 = md5_raw.and_then(|raw| {
            let normalized = normalize_md5(raw);
            if normalized.is_none() {
                warn!(contig = %name, md5 = %raw, "Invalid MD5 checksum format, ignoring");
            }
            normalized
        });
        contig.assembly_identifier = assembly.map(str::to_string);
        contig.uri = uri.map(str::to_string);
        contig.species = species.map(str::to_string);
        contigs.push(contig);
    }

    if contigs.is_empty() {
        return Err(Error::Format(
            "No @SQ lines found in sequence dictionary".to_string(),
        ));
    }

    Ok(contigs)
}
