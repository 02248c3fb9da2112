//! Aligner options shared by every plugin.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Value of an aligner-specific parameter.
///
/// JSON strings always deserialize as `Text`; `Char` is only built in code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Real(f64),
    Text(String),
    Char(char),
}

impl ParamValue {
    fn type_name(&self) -> &'static str {
        match self {
            Self::Char(_) => "char",
            Self::Text(_) => "text",
            Self::Int(_) => "int",
            Self::Real(_) => "real",
        }
    }

    fn mismatch(&self, expected: &'static str) -> Error {
        Error::Type {
            expected,
            found: self.type_name(),
        }
    }

    /// # Errors
    ///
    /// Returns `Error::Type` unless this is a `Char` or a one-character `Text`.
    pub fn as_char(&self) -> Result<char> {
        match self {
            Self::Char(c) => Ok(*c),
            Self::Text(s) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(c),
                    _ => Err(self.mismatch("char")),
                }
            }
            other => Err(other.mismatch("char")),
        }
    }

    /// # Errors
    ///
    /// Returns `Error::Type` unless this is a `Text`.
    pub fn as_text(&self) -> Result<&str> {
        match self {
            Self::Text(s) => Ok(s),
            other => Err(other.mismatch("text")),
        }
    }

    /// # Errors
    ///
    /// Returns `Error::Type` unless this is an `Int`.
    pub fn as_int(&self) -> Result<i64> {
        match self {
            Self::Int(i) => Ok(*i),
            other => Err(other.mismatch("int")),
        }
    }

    /// # Errors
    ///
    /// Returns `Error::Type` unless this is a `Real` or an `Int`.
    #[allow(clippy::cast_precision_loss)]
    pub fn as_real(&self) -> Result<f64> {
        match self {
            Self::Real(r) => Ok(*r),
            Self::Int(i) => Ok(*i as f64),
            other => Err(other.mismatch("real")),
        }
    }

    /// Interpret as a switch: `Int(1)`, `Text("true")`, `Text("1")` and
    /// `Char('1')` are on
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        match self {
            Self::Int(i) => *i == 1,
            Self::Text(s) => s == "1" || s.eq_ignore_ascii_case("true"),
            Self::Char(c) => *c == '1',
            Self::Real(_) => false,
        }
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<char> for ParamValue {
    fn from(value: char) -> Self {
        Self::Char(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Standard aligner options plus free-form aligner-specific parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignerOptions {
    /// Skip options the aligner does not understand instead of failing
    pub ignore_unsupported: bool,

    /// Minimum mapping quality to report an alignment
    pub mapq_min: u8,

    /// Minimum insert size for a properly paired fragment
    pub isize_min: u32,

    /// Maximum insert size for a properly paired fragment
    pub isize_max: u32,

    pub n_threads: usize,

    /// Share reference memory between processes where the aligner supports it
    pub share_ref_mem: bool,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, ParamValue>,
}

impl Default for AlignerOptions {
    fn default() -> Self {
        Self {
            ignore_unsupported: true,
            mapq_min: 0,
            isize_min: 0,
            isize_max: 1000,
            n_threads: 1,
            share_ref_mem: false,
            parameters: BTreeMap::new(),
        }
    }
}

impl AlignerOptions {
    /// Load options from a JSON file; absent fields keep their defaults
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be read or `Error::Format` if
    /// it is not valid options JSON.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// # Errors
    ///
    /// Returns `Error::Format` if `json` is not valid options JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Format(format!("Invalid options: {e}")))
    }

    #[must_use]
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn parameter(&self, key: &str) -> Option<&ParamValue> {
        self.parameters.get(key)
    }

    /// Check the standard options for consistency
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` if `isize_min > isize_max` or
    /// `n_threads` is 0.
    pub fn validate(&self) -> Result<()> {
        if self.isize_min > self.isize_max {
            return Err(Error::invalid(format!(
                "isize_min ({}) is greater than isize_max ({})",
                self.isize_min, self.isize_max
            )));
        }
        if self.n_threads == 0 {
            return Err(Error::invalid("n_threads must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_are_valid() {
        let opts = AlignerOptions::default();
        assert!(opts.validate().is_ok());
        assert_eq!(opts.n_threads, 1);
    }

    #[test]
    fn test_validate() {
        let opts = AlignerOptions {
            isize_min: 500,
            isize_max: 100,
            ..AlignerOptions::default()
        };
        assert_eq!(opts.validate().unwrap_err().kind(), ErrorKind::InvalidArgument);

        let opts = AlignerOptions {
            n_threads: 0,
            ..AlignerOptions::default()
        };
        assert!(opts.validate().is_err());
    }

    #[test]
    fn test_from_json_file() {
        let mut temp = NamedTempFile::with_suffix(".json").unwrap();
        write!(
            temp,
            r#"{{"mapq_min": 10, "n_threads": 4, "parameters": {{"compute_md5": 1, "mode": "fast", "penalty": 1.5}}}}"#
        )
        .unwrap();
        temp.flush().unwrap();

        let opts = AlignerOptions::from_json_file(temp.path()).unwrap();
        assert_eq!(opts.mapq_min, 10);
        assert_eq!(opts.n_threads, 4);
        assert_eq!(opts.isize_max, 1000); // default kept
        assert!(opts.parameter("compute_md5").unwrap().is_enabled());
        assert_eq!(opts.parameter("mode").unwrap().as_text().unwrap(), "fast");
        assert_eq!(opts.parameter("penalty").unwrap().as_real().unwrap(), 1.5);
    }

    #[test]
    fn test_invalid_json() {
        let err = AlignerOptions::from_json("{not json").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn test_param_type_errors() {
        let value = ParamValue::from("abc");
        assert_eq!(value.as_int().unwrap_err().kind(), ErrorKind::Type);
        assert_eq!(value.as_char().unwrap_err().kind(), ErrorKind::Type);
        assert_eq!(ParamValue::Int(3).as_real().unwrap(), 3.0);
        assert_eq!(ParamValue::Char('x').as_char().unwrap(), 'x');
    }

    #[test]
    fn test_is_enabled() {
        assert!(ParamValue::Int(1).is_enabled());
        assert!(ParamValue::from("TRUE").is_enabled());
        assert!(!ParamValue::Int(0).is_enabled());
        assert!(!ParamValue::from("no").is_enabled());
    }

    #[test]
    fn test_single_character_json_string_is_text() {
        let opts = AlignerOptions::from_json(r#"{"parameters": {"mode": "a", "flag": "1"}}"#)
            .unwrap();
        let mode = opts.parameter("mode").unwrap();
        assert_eq!(mode, &ParamValue::Text("a".to_string()));
        assert_eq!(mode.as_text().unwrap(), "a");
        assert_eq!(mode.as_char().unwrap(), 'a');
        assert!(opts.parameter("flag").unwrap().is_enabled());
        assert_eq!(ParamValue::from("ab").as_char().unwrap_err().kind(), ErrorKind::Type);
    }
}
