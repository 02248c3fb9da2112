use serde::{Deserialize, Serialize};

/// A single contig/sequence of a loaded reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contig {
    /// Sequence name (SN tag in SAM)
    pub name: String,

    /// Sequence length (LN tag in SAM)
    pub length: u64,

    /// Assembly identifier (AS tag in SAM)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assembly_identifier: Option<String>,

    /// Species (SP tag in SAM)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub species: Option<String>,

    /// URI where sequence can be retrieved (UR tag in SAM)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,

    /// MD5 checksum of the sequence (M5 tag in SAM)
    /// Lowercase hex, 32 characters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub md5: Option<String>,
}

impl Contig {
    pub fn new(name: impl Into<String>, length: u64) -> Self {
        Self {
            name: name.into(),
            length,
            assembly_identifier: None,
            species: None,
            uri: None,
            md5: None,
        }
    }

    #[must_use]
    pub fn with_md5(mut self, md5: impl Into<String>) -> Self {
        self.md5 = Some(md5.into());
        self
    }

    #[must_use]
    pub fn with_assembly(mut self, assembly: impl Into<String>) -> Self {
        self.assembly_identifier = Some(assembly.into());
        self
    }

    /// Copy optional metadata from `other` for every field not already set here
    pub fn merge_metadata(&mut self, other: &Contig) {
        if self.assembly_identifier.is_none() {
            self.assembly_identifier.clone_from(&other.assembly_identifier);
        }
        if self.species.is_none() {
            self.species.clone_from(&other.species);
        }
        if self.uri.is_none() {
            self.uri.clone_from(&other.uri);
        }
        if self.md5.is_none() {
            self.md5.clone_from(&other.md5);
        }
    }

    /// The `@SQ` header fields for this contig, in `SN, LN, AS, M5, SP, UR` order
    #[must_use]
    pub fn sam_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![("SN", self.name.clone()), ("LN", self.length.to_string())];
        let optional = [
            ("AS", &self.assembly_identifier),
            ("M5", &self.md5),
            ("SP", &self.species),
            ("UR", &self.uri),
        ];
        for (tag, value) in optional {
            if let Some(value) = value {
                fields.push((tag, value.clone()));
            }
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_has_no_metadata() {
        let c = Contig::new("chr1", 60000);
        assert_eq!(c.name, "chr1");
        assert_eq!(c.length, 60000);
        for v in [&c.assembly_identifier, &c.species, &c.uri, &c.md5] {
            assert!(v.is_none());
        }
    }

    #[test]
    fn test_merge_metadata_keeps_existing() {
        let mut c = Contig::new("chr1", 100).with_md5("aaaa");
        let mut other = Contig::new("chr1", 100)
            .with_md5("bbbb")
            .with_assembly("GRCh38");
        other.species = Some("Homo sapiens".to_string());

        c.merge_metadata(&other);
        assert_eq!(c.md5.as_deref(), Some("aaaa"));
        assert_eq!(c.assembly_identifier.as_deref(), Some("GRCh38"));
        assert_eq!(c.species.as_deref(), Some("Homo sapiens"));
        assert!(c.uri.is_none());
    }

    #[test]
    fn test_sam_fields() {
        let c = Contig::new("chrM", 16569).with_assembly("hg38");
        let fields = c.sam_fields();
        assert_eq!(
            fields,
            vec![
                ("SN", "chrM".to_string()),
                ("LN", "16569".to_string()),
                ("AS", "hg38".to_string())
            ]
        );
    }
}
