use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Offset of the Sanger (Phred+33) encoding
pub const SANGER_OFFSET: u8 = 33;

/// Offset of the Illumina 1.3+ (Phred+64) encoding
pub const ILLUMINA_OFFSET: u8 = 64;

/// Highest printable quality byte accepted in either encoding
pub const MAX_QUALITY_BYTE: u8 = 126;

/// Base quality encoding of an input quality string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityEncoding {
    #[default]
    Sanger,
    Illumina,
}

impl QualityEncoding {
    #[must_use]
    pub fn offset(self) -> u8 {
        match self {
            Self::Sanger => SANGER_OFFSET,
            Self::Illumina => ILLUMINA_OFFSET,
        }
    }
}

impl std::fmt::Display for QualityEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sanger => write!(f, "Sanger"),
            Self::Illumina => write!(f, "Illumina"),
        }
    }
}

/// Convert a quality string to Sanger encoding, validating every byte.
///
/// Valid raw bytes are `[33, 126]` for Sanger and `[64, 126]` for Illumina.
/// An absent quality is passed through untouched.
///
/// # Errors
///
/// Returns `Error::QualityRange` naming the first offending position.
pub fn normalize(quality: Option<&str>, encoding: QualityEncoding) -> Result<Option<String>> {
    let Some(quality) = quality else {
        return Ok(None);
    };

    let offset = encoding.offset();
    let mut sanger = Vec::with_capacity(quality.len());
    for (index, &value) in quality.as_bytes().iter().enumerate() {
        if !(offset..=MAX_QUALITY_BYTE).contains(&value) {
            return Err(Error::QualityRange {
                index,
                value,
                encoding,
            });
        }
        sanger.push(value - offset + SANGER_OFFSET);
    }

    // every byte is in [33, 126], hence ASCII
    String::from_utf8(sanger)
        .map(Some)
        .map_err(|e| Error::Format(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_sanger_passthrough() {
        let q = normalize(Some("EEEE#I"), QualityEncoding::Sanger).unwrap();
        assert_eq!(q.as_deref(), Some("EEEE#I"));
    }

    #[test]
    fn test_illumina_conversion() {
        let sanger = "II5@#+";
        let illumina: String = sanger.bytes().map(|b| char::from(b - 33 + 64)).collect();
        let q = normalize(Some(&illumina), QualityEncoding::Illumina).unwrap();
        assert_eq!(q.as_deref(), Some(sanger));
    }

    #[test]
    fn test_absent_quality() {
        assert_eq!(normalize(None, QualityEncoding::Illumina).unwrap(), None);
    }

    #[test]
    fn test_boundaries() {
        assert!(normalize(Some("!~"), QualityEncoding::Sanger).is_ok());
        assert!(normalize(Some("@~"), QualityEncoding::Illumina).is_ok());

        for (q, enc) in [
            ("\u{20}", QualityEncoding::Sanger),
            ("\u{7f}", QualityEncoding::Sanger),
            ("?", QualityEncoding::Illumina),
            ("\u{7f}", QualityEncoding::Illumina),
        ] {
            let err = normalize(Some(q), enc).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::QualityRange);
        }
    }

    #[test]
    fn test_error_reports_index() {
        match normalize(Some("EE EE"), QualityEncoding::Sanger) {
            Err(Error::QualityRange { index, value, .. }) => {
                assert_eq!(index, 2);
                assert_eq!(value, 32);
            }
            other => panic!("unexpected result {other:?}"),
        }
    }
}
