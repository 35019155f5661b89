//! SHA-256 helpers: blob checksums and the webhook secret check.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// Key for the tags compared by [`secrets_match`].
const SECRET_CHECK_KEY: &[u8] = b"content-engine/webhook-secret";

/// Compute a SHA-256 hex digest of the given bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    let hash = Sha256::digest(data);
    format!("{hash:x}")
}

/// Compare two shared secrets in constant time.
///
/// Both values are reduced to HMAC-SHA256 tags under a fixed key and the
/// tags are checked with [`Mac::verify_slice`].
pub fn secrets_match(provided: &str, expected: &str) -> bool {
    let (Ok(mut expected_mac), Ok(mut provided_mac)) = (
        HmacSha256::new_from_slice(SECRET_CHECK_KEY),
        HmacSha256::new_from_slice(SECRET_CHECK_KEY),
    ) else {
        return false;
    };
    expected_mac.update(expected.as_bytes());
    let expected_tag = expected_mac.finalize().into_bytes();

    provided_mac.update(provided.as_bytes());
    provided_mac.verify_slice(&expected_tag).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_produces_known_hash() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn identical_secrets_match() {
        assert!(secrets_match("s3cret", "s3cret"));
    }

    #[test]
    fn different_secrets_do_not_match() {
        assert!(!secrets_match("s3cret", "s3cret "));
        assert!(!secrets_match("", "s3cret"));
    }

    #[test]
    fn prefix_of_expected_does_not_match() {
        assert!(!secrets_match("s3cre", "s3cret"));
        assert!(!secrets_match("s3cret", ""));
    }

    #[test]
    fn empty_secrets_match_each_other() {
        assert!(secrets_match("", ""));
    }
}
