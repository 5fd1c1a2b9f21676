//! Registry names and their validation rules.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum name length
pub const MIN_NAME_LEN: usize = 3;
/// Maximum name length
pub const MAX_NAME_LEN: usize = 64;

/// A validated registry name.
///
/// Names are 3-64 characters from `[a-z0-9-]`, with no leading or trailing
/// hyphen. Validation happens exactly once, at construction; every `Name`
/// in circulation is well-formed.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Name(String);

impl Name {
    /// Parse and validate a name
    ///
    /// # Errors
    /// Returns error if length or charset rules are violated
    pub fn parse(s: &str) -> Result<Self, NameError> {
        if s.len() < MIN_NAME_LEN {
            return Err(NameError::TooShort(s.len()));
        }
        if s.len() > MAX_NAME_LEN {
            return Err(NameError::TooLong(s.len()));
        }
        if let Some(c) = s
            .chars()
            .find(|c| !matches!(c, 'a'..='z' | '0'..='9' | '-'))
        {
            return Err(NameError::InvalidChar(c));
        }
        if s.starts_with('-') || s.ends_with('-') {
            return Err(NameError::EdgeHyphen);
        }
        Ok(Self(s.to_string()))
    }

    /// The name as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name length in characters (equal to bytes; the charset is ASCII)
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false: the empty string never validates
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Whether every character is a digit
    #[must_use]
    pub fn is_digits_only(&self) -> bool {
        self.0.chars().all(|c| c.is_ascii_digit())
    }

    /// Whether every character is a lowercase letter
    #[must_use]
    pub fn is_letters_only(&self) -> bool {
        self.0.chars().all(|c| c.is_ascii_lowercase())
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.0)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Name {
    type Error = NameError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Name> for String {
    fn from(name: Name) -> Self {
        name.0
    }
}

impl AsRef<str> for Name {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Name validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    /// Shorter than the minimum length
    #[error("name too short: {0} chars (minimum {MIN_NAME_LEN})")]
    TooShort(usize),
    /// Longer than the maximum length
    #[error("name too long: {0} chars (maximum {MAX_NAME_LEN})")]
    TooLong(usize),
    /// Character outside `[a-z0-9-]`
    #[error("invalid character {0:?}: names use [a-z0-9-]")]
    InvalidChar(char),
    /// Leading or trailing hyphen
    #[error("names may not start or end with a hyphen")]
    EdgeHyphen,
}
