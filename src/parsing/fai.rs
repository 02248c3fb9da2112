//! Parser for FASTA index (.fai) files using noodles.
//!
//! FAI format provides name and length for each contig, but no MD5.
//! Format: `name\tlength\toffset\tline_bases\tline_width`

use std::io::BufReader;
use std::path::{Path, PathBuf};

use noodles::fasta;

use crate::core::contig::Contig;
use crate::error::{Error, Result};
use crate::utils::validation::check_contig_limit;

/// Path of the index that sits next to a FASTA file (`ref.fa` -> `ref.fa.fai`)
#[must_use]
pub fn sibling_index_path(fasta_path: &Path) -> PathBuf {
    let mut name = fasta_path.as_os_str().to_owned();
    name.push(".fai");
    PathBuf::from(name)
}

/// Parse a FASTA index (.fai) file using noodles
///
/// # Errors
///
/// Returns `Error::Io` if the file cannot be read, `Error::Format` if
/// parsing fails or no contigs are found, or `Error::InvalidArgument` if
/// the contig limit is exceeded.
pub fn parse_fai_file(path: &Path) -> Result<Vec<Contig>> {
    let reader = std::fs::File::open(path).map(BufReader::new)?;

    let index = fasta::fai::io::Reader::new(reader)
        .read_index()
        .map_err(|e| Error::Format(format!("Failed to parse FAI file: {e}")))?;

    index_to_contigs(&index)
}

fn index_to_contigs(index: &fasta::fai::Index) -> Result<Vec<Contig>> {
    let mut contigs = Vec::new();

    for record in index.as_ref() {
        if let Some(msg) = check_contig_limit(contigs.len()) {
            return Err(Error::InvalidArgument(msg));
        }

        let name = String::from_utf8_lossy(record.name()).to_string();
        contigs.push(Contig::new(name, record.length()));
    }

    if contigs.is_empty() {
        return Err(Error::Format("No contigs found in FAI file".to_string()));
    }

    Ok(contigs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_sibling_index_path() {
        assert_eq!(
            sibling_index_path(Path::new("/data/hg38.fa.gz")),
            PathBuf::from("/data/hg38.fa.gz.fai")
        );
    }

    #[test]
    fn test_parse_fai_file() {
        let fai = "chr1\t248956422\t112\t70\t71\n\
                   chr2\t242193529\t253404903\t70\t71\n\
                   chrM\t16569\t3099922541\t70\t71\n";

        let mut temp = NamedTempFile::with_suffix(".fai").unwrap();
        temp.write_all(fai.as_bytes()).unwrap();
        temp.flush().unwrap();

        let contigs = parse_fai_file(temp.path()).unwrap();
        assert_eq!(contigs.len(), 3);
        assert_eq!(contigs[0].name, "chr1");
        assert_eq!(contigs[0].length, 248_956_422);
        assert!(contigs[0].md5.is_none()); // FAI doesn't have MD5
        assert_eq!(contigs[2].name, "chrM");
        assert_eq!(contigs[2].length, 16569);
    }

    #[test]
    fn test_parse_fai_empty() {
        let temp = NamedTempFile::with_suffix(".fai").unwrap();
        assert!(parse_fai_file(temp.path()).is_err());
    }
}
