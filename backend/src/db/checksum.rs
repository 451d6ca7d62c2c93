//! Checksum calculation for upload deduplication.

use sha2::{Digest, Sha256};

/// Calculate the SHA-256 checksum of an uploaded export.
///
/// # Returns
/// Lowercase hexadecimal string of the hash.
pub fn calculate_checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_is_stable() {
        let content = "pcId,userId,duration,hour,timestamp\nPC-1,u1,60,14,2024-05-01T14:00:00Z\n";
        assert_eq!(calculate_checksum(content), calculate_checksum(content));
        assert_eq!(calculate_checksum(content).len(), 64);
    }

    #[test]
    fn test_known_digest() {
        assert_eq!(
            calculate_checksum(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_one_changed_row_changes_checksum() {
        let first = "PC-1,u1,60,14,2024-05-01T14:00:00Z";
        let second = "PC-1,u1,61,14,2024-05-01T14:00:00Z";
        assert_ne!(calculate_checksum(first), calculate_checksum(second));
    }
}
