use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::errors::{Result, RetrievalError};

/// SHA-256 fingerprint of a chunk's text, lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(String);

impl ContentHash {
    pub fn new(hash: String) -> Result<Self> {
        if hash.len() != 64 || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(RetrievalError::invalid_argument(format!(
                "content hash must be 64 hex characters, got {:?}",
                hash
            )));
        }

        Ok(Self(hash.to_lowercase()))
    }

    pub fn of_text(text: &str) -> Self {
        let digest = Sha256::digest(text.as_bytes());
        Self(format!("{:x}", digest))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digest() {
        let hash = ContentHash::of_text("hello world");
        assert_eq!(
            hash.as_str(),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_parse_normalizes_case() {
        let upper = "B94D27B9934D3E08A52E52D7DA7DABFAC484EFE37A5380EE9088F7ACE2EFCDE9";
        let hash = ContentHash::new(upper.to_string()).unwrap();
        assert_eq!(hash, ContentHash::of_text("hello world"));
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(ContentHash::new("abc".to_string()).is_err());
        let non_hex = "g".repeat(64);
        assert!(ContentHash::new(non_hex).is_err());
    }
}
