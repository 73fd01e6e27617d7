use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

static CODE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{3}-\d{3}-\d{3}$|^\d{9}$").expect("static pattern"));

/// Lowest and one-past-highest numeric value a generated code may take.
pub const CODE_RANGE: std::ops::Range<u32> = 100_000_000..1_000_000_000;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodeError {
    #[error("sharing code must be nine digits, got {0:?}")]
    Malformed(String),
}

/// Short human-typed room code in `DDD-DDD-DDD` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SharingCode(String);

impl SharingCode {
    /// Formats a nine digit number as a code.
    pub fn from_number(n: u32) -> Result<Self, CodeError> {
        if !CODE_RANGE.contains(&n) {
            return Err(CodeError::Malformed(n.to_string()));
        }
        Self::parse(&n.to_string())
    }

    /// Normalizes user input and validates the result.
    pub fn parse(input: &str) -> Result<Self, CodeError> {
        let normalized = normalize_code(input);
        if is_valid_code(&normalized) {
            Ok(Self(normalized))
        } else {
            Err(CodeError::Malformed(input.to_owned()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Strips every non-digit and re-inserts a dash after each group of three.
pub fn normalize_code(input: &str) -> String {
    let digits: Vec<char> = input.chars().filter(char::is_ascii_digit).collect();
    digits
        .chunks(3)
        .map(|group| group.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("-")
}

pub fn is_valid_code(code: &str) -> bool {
    CODE_PATTERN.is_match(code)
}

impl fmt::Display for SharingCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SharingCode {
    type Error = CodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SharingCode> for String {
    fn from(code: SharingCode) -> Self {
        code.0
    }
}
