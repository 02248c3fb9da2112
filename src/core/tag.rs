use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Value of a SAM optional field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagValue {
    Char(char),
    Int(i64),
    Real(f64),
    Text(String),
}

impl TagValue {
    /// SAM type character: `A`, `Z`, `i` or `f`
    #[must_use]
    pub fn sam_type(&self) -> char {
        match self {
            Self::Char(_) => 'A',
            Self::Text(_) => 'Z',
            Self::Int(_) => 'i',
            Self::Real(_) => 'f',
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Self::Char(_) => "char",
            Self::Text(_) => "text",
            Self::Int(_) => "integer",
            Self::Real(_) => "real",
        }
    }

    /// # Errors
    ///
    /// Returns `Error::Type` if the value is not a character.
    pub fn as_char(&self) -> Result<char> {
        match self {
            Self::Char(c) => Ok(*c),
            other => Err(Error::Type {
                expected: "char",
                found: other.type_name(),
            }),
        }
    }

    /// # Errors
    ///
    /// Returns `Error::Type` if the value is not text.
    pub fn as_text(&self) -> Result<&str> {
        match self {
            Self::Text(s) => Ok(s),
            other => Err(Error::Type {
                expected: "text",
                found: other.type_name(),
            }),
        }
    }

    /// # Errors
    ///
    /// Returns `Error::Type` if the value is not an integer.
    pub fn as_int(&self) -> Result<i64> {
        match self {
            Self::Int(i) => Ok(*i),
            other => Err(Error::Type {
                expected: "integer",
                found: other.type_name(),
            }),
        }
    }

    /// # Errors
    ///
    /// Returns `Error::Type` if the value is not a real number.
    pub fn as_real(&self) -> Result<f64> {
        match self {
            Self::Real(d) => Ok(*d),
            other => Err(Error::Type {
                expected: "real",
                found: other.type_name(),
            }),
        }
    }
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Char(c) => write!(f, "{c}"),
            Self::Text(s) => f.write_str(s),
            Self::Int(i) => write!(f, "{i}"),
            Self::Real(d) => write!(f, "{d:.6}"),
        }
    }
}

impl From<&str> for TagValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for TagValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for TagValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for TagValue {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<u32> for TagValue {
    fn from(i: u32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<char> for TagValue {
    fn from(c: char) -> Self {
        Self::Char(c)
    }
}

impl From<f64> for TagValue {
    fn from(d: f64) -> Self {
        Self::Real(d)
    }
}

/// Check a SAM tag name: two ASCII alphanumeric characters, the first a letter
///
/// # Errors
///
/// Returns `Error::InvalidArgument` for any other key.
pub fn validate_tag_key(key: &str) -> Result<()> {
    let bytes = key.as_bytes();
    if bytes.len() == 2 && bytes[0].is_ascii_alphabetic() && bytes[1].is_ascii_alphanumeric() {
        Ok(())
    } else {
        Err(Error::invalid(format!("Invalid SAM tag name '{key}'")))
    }
}

/// Render a tag as `KEY:TYPE:VALUE`
#[must_use]
pub fn format_tag(key: &str, value: &TagValue) -> String {
    format!("{key}:{}:{value}", value.sam_type())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_format_tag() {
        assert_eq!(format_tag("MD", &"11^CCC49".into()), "MD:Z:11^CCC49");
        assert_eq!(format_tag("XS", &TagValue::Int(0)), "XS:i:0");
        assert_eq!(format_tag("XT", &TagValue::Char('U')), "XT:A:U");
        assert_eq!(format_tag("XF", &TagValue::Real(0.5)), "XF:f:0.500000");
    }

    #[test]
    fn test_typed_access() {
        let v = TagValue::Int(42);
        assert_eq!(v.as_int().unwrap(), 42);
        assert_eq!(v.as_text().unwrap_err().kind(), ErrorKind::Type);
        assert_eq!(v.as_char().unwrap_err().kind(), ErrorKind::Type);
        assert_eq!(v.as_real().unwrap_err().kind(), ErrorKind::Type);
        assert_eq!(TagValue::from("60").as_text().unwrap(), "60");
    }

    #[test]
    fn test_validate_tag_key() {
        assert!(validate_tag_key("MD").is_ok());
        assert!(validate_tag_key("X0").is_ok());
        assert!(validate_tag_key("0X").is_err());
        assert!(validate_tag_key("M").is_err());
        assert!(validate_tag_key("MDZ").is_err());
    }
}
