//! Email address value object

use std::fmt;

use serde::{Deserialize, Serialize};

use super::result::{Error, Result};

/// Why an email could not be normalized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailFormatError {
    MissingAt,
    EmptyLocalPart,
    EmptyDomain,
    ContainsWhitespace,
}

impl fmt::Display for EmailFormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::MissingAt => "missing '@' separator",
            Self::EmptyLocalPart => "empty local part",
            Self::EmptyDomain => "empty domain",
            Self::ContainsWhitespace => "contains whitespace",
        };
        f.write_str(msg)
    }
}

/// Canonicalize an email for uniqueness comparison.
///
/// Surrounding whitespace is trimmed and the domain (everything after the
/// last `@`) is lowercased. The local part keeps its case.
pub fn normalize_email(raw: &str) -> std::result::Result<String, EmailFormatError> {
    let trimmed = raw.trim();
    if trimmed.chars().any(char::is_whitespace) {
        return Err(EmailFormatError::ContainsWhitespace);
    }

    let (local, domain) = trimmed
        .rsplit_once('@')
        .ok_or(EmailFormatError::MissingAt)?;
    if local.is_empty() {
        return Err(EmailFormatError::EmptyLocalPart);
    }
    if domain.is_empty() {
        return Err(EmailFormatError::EmptyDomain);
    }

    Ok(format!("{}@{}", local, domain.to_lowercase()))
}

/// A normalized email address
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Validate and normalize a raw email.
    ///
    /// Absent, empty and whitespace-only input is a missing field; anything
    /// the normalizer rejects is an invalid format.
    pub fn parse(raw: Option<&str>) -> Result<Self> {
        let raw = match raw {
            Some(raw) if !raw.trim().is_empty() => raw,
            _ => return Err(Error::MissingField("email")),
        };

        normalize_email(raw)
            .map(Self)
            .map_err(|e| Error::invalid_format("email", e.to_string()))
    }

    /// The part after the last `@`
    pub fn domain(&self) -> &str {
        self.0.rsplit_once('@').map(|(_, d)| d).unwrap_or_default()
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Email {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(Some(value.as_str()))
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}
