//! Error type shared by every layer of the crate.
//!
//! Each variant corresponds to one failure category of the aligner API. Callers
//! that only need to branch on the category can use [`Error::kind`].

use std::path::PathBuf;

use thiserror::Error;

use crate::core::quality::QualityEncoding;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Index out of range: {what} index {index} not in [0, {bound})")]
    Index {
        what: &'static str,
        index: usize,
        bound: usize,
    },

    #[error("Type error: expected {expected}, found {found}")]
    Type {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Base quality {value} at position {index} is out of range for {encoding} encoding")]
    QualityRange {
        index: usize,
        value: u8,
        encoding: QualityEncoding,
    },

    #[error("Failed to load reference {}: {reason}", path.display())]
    ReferenceLoad { path: PathBuf, reason: String },

    #[error("Aligner initialization error: {0}")]
    Init(String),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Unable to allocate space for {0} reads")]
    OutOfMemory(usize),

    #[error("Unsupported: {0}")]
    Unsupported(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse error category, independent of the payload carried by [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    Index,
    Type,
    QualityRange,
    ReferenceLoad,
    Init,
    Format,
    OutOfMemory,
    Unsupported,
    Io,
}

impl Error {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::Index { .. } => ErrorKind::Index,
            Self::Type { .. } => ErrorKind::Type,
            Self::QualityRange { .. } => ErrorKind::QualityRange,
            Self::ReferenceLoad { .. } => ErrorKind::ReferenceLoad,
            Self::Init(_) => ErrorKind::Init,
            Self::Format(_) => ErrorKind::Format,
            Self::OutOfMemory(_) => ErrorKind::OutOfMemory,
            Self::Unsupported(_) => ErrorKind::Unsupported,
            Self::Io(_) => ErrorKind::Io,
        }
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub(crate) fn reference_load(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ReferenceLoad {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Map an IO error raised while decoding a record to a [`Error::Format`]
    /// when it signals malformed data.
    pub(crate) fn from_record_io(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::InvalidData | std::io::ErrorKind::UnexpectedEof => {
                Self::Format(err.to_string())
            }
            _ => Self::Io(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_variant() {
        let err = Error::Index {
            what: "fragment",
            index: 3,
            bound: 2,
        };
        assert_eq!(err.kind(), ErrorKind::Index);
        assert_eq!(
            err.to_string(),
            "Index out of range: fragment index 3 not in [0, 2)"
        );
    }

    #[test]
    fn test_record_io_mapping() {
        let bad = std::io::Error::new(std::io::ErrorKind::InvalidData, "missing '+'");
        assert_eq!(Error::from_record_io(bad).kind(), ErrorKind::Format);

        let denied = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        assert_eq!(Error::from_record_io(denied).kind(), ErrorKind::Io);
    }
}
