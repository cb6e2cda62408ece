//! Reference key scheme.
//!
//! An encrypted field never carries its real value in the configuration
//! file; it carries a reference key of the form `<prefix>_ENC_<token>`,
//! where `prefix` is the field identifier and `token` is a random
//! 128-bit hex suffix. The `_ENC` marker directly after the prefix is the
//! sole mechanism used to tell an already-encrypted value from plaintext.

use chacha20poly1305::aead::{rand_core::RngCore, OsRng};

/// Marker inserted between the field prefix and the random token.
pub const MARKER: &str = "_ENC";

/// Random token length in bytes (128 bits, hex-encoded to 32 characters).
const TOKEN_BYTES: usize = 16;

/// Generates a fresh reference key for the given field prefix.
///
/// Every call produces a distinct key, even for the same prefix.
#[must_use]
pub fn generate(prefix: &str) -> String {
    let mut token = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut token);
    format!("{prefix}{MARKER}_{}", hex::encode(token))
}

/// Checks whether `value` is a reference key for the given field prefix.
///
/// Matches on `value.starts_with("<prefix>_ENC")`; the match is
/// case-sensitive, unlike the store's prefix search.
#[must_use]
pub fn is_reference(prefix: &str, value: &str) -> bool {
    // Avoid allocating for the common plaintext case.
    value.len() >= prefix.len() + MARKER.len()
        && value.starts_with(prefix)
        && value[prefix.len()..].starts_with(MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_format() {
        let key = generate("GithubToken");
        assert!(key.starts_with("GithubToken_ENC_"));

        let token = key.strip_prefix("GithubToken_ENC_").unwrap();
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generate_unique() {
        let a = generate("token");
        let b = generate("token");
        assert_ne!(a, b);
    }

    #[test]
    fn test_is_reference() {
        assert!(is_reference("GithubToken", &generate("GithubToken")));
        assert!(is_reference("GithubToken", "GithubToken_ENC_abc"));
        assert!(is_reference("GithubToken", "GithubToken_ENC"));
        // Plaintext, wrong prefix, bare prefix
        assert!(!is_reference("GithubToken", "ghp_123"));
        assert!(!is_reference("GithubToken", "GiteaToken_ENC_abc"));
        assert!(!is_reference("GithubToken", "GithubToken"));
    }

    #[test]
    fn test_is_reference_case_sensitive() {
        assert!(!is_reference("GithubToken", "githubtoken_ENC_abc"));
    }
}
