use std::{fmt, str::FromStr, sync::LazyLock};

use regex::Regex;
use thiserror::Error;

use crate::constants::DEFAULT_POSTCODE;

const POSTCODE_PATTERN: &str = r"^[A-Z0-9]{2,10}$";
static POSTCODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(POSTCODE_PATTERN).expect("Invalid regex pattern"));

/// A postcode that is safe to splice into a URL path.
///
/// Whitespace is removed and letters are uppercased, so `"ct1 2eh"` and
/// `"CT12EH"` are the same postcode.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Postcode(String);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PostcodeError {
    #[error("the postcode is empty")]
    Empty,
    #[error("`{0}` is not a valid postcode")]
    Malformed(String),
}

impl Postcode {
    pub fn parse(raw: &str) -> Result<Self, PostcodeError> {
        let normalized: String = raw
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| c.to_ascii_uppercase())
            .collect();
        if normalized.is_empty() {
            return Err(PostcodeError::Empty);
        }
        if !POSTCODE_REGEX.is_match(&normalized) {
            return Err(PostcodeError::Malformed(raw.to_string()));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Postcode {
    fn default() -> Self {
        Self(DEFAULT_POSTCODE.to_string())
    }
}

impl FromStr for Postcode {
    type Err = PostcodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Postcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_normalizes() {
        let postcode = Postcode::parse(" ct1 2eh ").unwrap();
        assert_eq!(postcode.as_str(), "CT12EH");
    }

    #[test]
    fn parse_empty() {
        assert_eq!(Postcode::parse("   "), Err(PostcodeError::Empty));
    }

    #[test]
    fn parse_rejects_path_characters() {
        assert_eq!(
            Postcode::parse("CT1/../2EH"),
            Err(PostcodeError::Malformed("CT1/../2EH".to_string()))
        );
    }

    #[test]
    fn parse_rejects_too_long() {
        assert!(Postcode::parse("ABCDEFGHIJK").is_err());
    }

    #[test]
    fn default_is_canterbury() {
        assert_eq!(Postcode::default().as_str(), DEFAULT_POSTCODE);
    }
}
