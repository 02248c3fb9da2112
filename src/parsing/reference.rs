//! Assemble a [`ReferenceCatalog`] from a FASTA file and its companions.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::core::contig::Contig;
use crate::core::reference::ReferenceCatalog;
use crate::error::{Error, Result};
use crate::parsing::dict::{parse_dict_file, sibling_dict_paths};
use crate::parsing::fai::{parse_fai_file, sibling_index_path};
use crate::parsing::fasta::{is_fasta_file, parse_fasta_file};

/// Load contig metadata for the FASTA reference at `path`.
///
/// Names and lengths come from a sibling `.fai` if one exists and no MD5 is
/// requested, otherwise the FASTA is scanned. Metadata from the first sibling
/// `.dict` found is merged into contigs of the same name and length.
///
/// # Errors
///
/// Every failure is reported as `Error::ReferenceLoad` for `path`.
pub fn load_reference(path: &Path, compute_md5: bool) -> Result<ReferenceCatalog> {
    if !path.is_file() {
        return Err(Error::reference_load(path, "file does not exist"));
    }
    if !is_fasta_file(path) {
        warn!(path = %path.display(), "Reference does not have a FASTA extension");
    }

    let mut contigs = read_contigs(path, compute_md5)
        .map_err(|e| Error::reference_load(path, e.to_string()))?;

    if let Some(dict_path) = sibling_dict_paths(path).into_iter().find(|p| p.is_file()) {
        let dict = parse_dict_file(&dict_path)
            .map_err(|e| Error::reference_load(&dict_path, e.to_string()))?;
        let merged = merge_dictionary(&mut contigs, &dict);
        debug!(dict = %dict_path.display(), merged, "Merged sequence dictionary");
    }

    let catalog = ReferenceCatalog::new(path, contigs)?;
    info!(path = %path.display(), contigs = catalog.len(), "Loaded reference");
    Ok(catalog)
}

fn read_contigs(path: &Path, compute_md5: bool) -> Result<Vec<Contig>> {
    let index_path = sibling_index_path(path);
    if !compute_md5 && index_path.is_file() {
        debug!(index = %index_path.display(), "Using FASTA index");
        return parse_fai_file(&index_path);
    }
    parse_fasta_file(path, compute_md5)
}

/// Merge dictionary metadata into matching contigs; returns how many matched
fn merge_dictionary(contigs: &mut [Contig], dict: &[Contig]) -> usize {
    let mut merged = 0;
    for contig in contigs.iter_mut() {
        if let Some(entry) = dict
            .iter()
            .find(|d| d.name == contig.name && d.length == contig.length)
        {
            contig.merge_metadata(entry);
            merged += 1;
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::TempDir;

    fn write_reference(dir: &TempDir, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_missing_reference() {
        let err = load_reference(Path::new("/no/such/ref.fa"), false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ReferenceLoad);
    }

    #[test]
    fn test_invalid_reference() {
        let dir = TempDir::new().unwrap();
        let path = write_reference(&dir, "empty.fa", "");
        let err = load_reference(&path, false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ReferenceLoad);
    }

    #[test]
    fn test_single_contig_60000_bases() {
        let dir = TempDir::new().unwrap();
        let mut body = String::from(">chr\n");
        for _ in 0..1000 {
            body.push_str(&"ACGTAC".repeat(10));
            body.push('\n');
        }
        let path = write_reference(&dir, "chr.fa", &body);

        let catalog = load_reference(&path, false).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog[0].name, "chr");
        assert_eq!(catalog[0].length, 60_000);
    }

    #[test]
    fn test_uses_index_when_present() {
        let dir = TempDir::new().unwrap();
        let path = write_reference(&dir, "ref.fa", ">chr1\nACGT\n");
        // The index wins over scanning, so its length is reported
        write_reference(&dir, "ref.fa.fai", "chr1\t99\t6\t4\t5\n");

        let catalog = load_reference(&path, false).unwrap();
        assert_eq!(catalog[0].length, 99);

        let catalog = load_reference(&path, true).unwrap();
        assert_eq!(catalog[0].length, 4);
        assert!(catalog[0].md5.is_some());
    }

    #[test]
    fn test_merges_dictionary() {
        let dir = TempDir::new().unwrap();
        let path = write_reference(&dir, "ref.fa", ">chr1\nACGT\n>chr2\nGG\n");
        write_reference(
            &dir,
            "ref.dict",
            "@HD\tVN:1.6\n@SQ\tSN:chr1\tLN:4\tAS:test\tSP:Homo sapiens\n@SQ\tSN:chr2\tLN:3\tAS:test\n",
        );

        let catalog = load_reference(&path, false).unwrap();
        assert_eq!(catalog[0].assembly_identifier.as_deref(), Some("test"));
        assert_eq!(catalog[0].species.as_deref(), Some("Homo sapiens"));
        // Length disagrees, so nothing is merged
        assert!(catalog[1].assembly_identifier.is_none());
    }
}
