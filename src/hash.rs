use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of the raw document bytes.
pub fn compute_content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digest() {
        assert_eq!(
            compute_content_hash(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            compute_content_hash("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_whitespace_changes_hash() {
        assert_ne!(compute_content_hash("<A/>"), compute_content_hash("<A/>\n"));
        assert_eq!(compute_content_hash("<A/>").len(), 64);
    }
}
