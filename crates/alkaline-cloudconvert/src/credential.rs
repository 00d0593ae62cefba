//! Bearer credential sent with every API request.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// An opaque CloudConvert API key.
///
/// The only validation is that the token is not blank. `Debug` never prints
/// the token itself so the credential can be logged alongside other state.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Create a credential from a raw token, trimming surrounding whitespace.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidInput("API key cannot be empty".into()));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The raw token.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub(crate) fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

impl FromStr for Credential {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_token() {
        let credential = Credential::new("  abc123\n").unwrap();
        assert_eq!(credential.expose(), "abc123");
        assert_eq!(credential.bearer(), "Bearer abc123");
    }

    #[test]
    fn rejects_blank_token() {
        assert!(Credential::new("").is_err());
        assert!("   ".parse::<Credential>().is_err());
    }

    #[test]
    fn debug_is_redacted() {
        let credential = Credential::new("secret-token").unwrap();
        let debug = format!("{credential:?}");
        assert!(!debug.contains("secret-token"));
    }
}
