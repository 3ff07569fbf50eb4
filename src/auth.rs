//! Ciphertext verification for deployment requests
//!
//! A trusted client proves knowledge of the shared salt by sending an
//! authentication tag computed over the request fields. The tag is an
//! HMAC-SHA256 keyed by the salt over the concatenation of artifact name,
//! timestamp, and declared size, hex-encoded lowercase. Comparison is
//! constant-time to prevent timing attacks; a malformed tag and a wrong
//! tag are equally "not authenticated".

use constant_time_eq::constant_time_eq;
use ring::hmac;

/// Compute the expected authentication tag for a request
pub fn compute_tag(artifact_name: &str, timestamp_ms: i64, declared_size: u64, salt: &str) -> String {
    let raw = format!("{}{}{}", artifact_name, timestamp_ms, declared_size);
    let key = hmac::Key::new(hmac::HMAC_SHA256, salt.as_bytes());
    let tag = hmac::sign(&key, raw.as_bytes());
    hex::encode(tag.as_ref())
}

/// Verify a client-supplied authentication tag. Pure function of its
/// inputs; the comparison is exact and case-sensitive.
pub fn authenticate(
    artifact_name: &str,
    timestamp_ms: i64,
    declared_size: u64,
    salt: &str,
    supplied_tag: &str,
) -> bool {
    let expected = compute_tag(artifact_name, timestamp_ms, declared_size, salt);
    constant_time_eq(expected.as_bytes(), supplied_tag.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SALT: &str = "test-salt-value";

    #[test]
    fn test_matching_tag_authenticates() {
        let tag = compute_tag("app-1.2.0.jar", 1_700_000_000_000, 1_048_576, SALT);
        assert!(authenticate(
            "app-1.2.0.jar",
            1_700_000_000_000,
            1_048_576,
            SALT,
            &tag
        ));
    }

    #[test]
    fn test_single_character_mutation_fails() {
        let tag = compute_tag("app-1.2.0.jar", 1_700_000_000_000, 1_048_576, SALT);
        let mut mutated: Vec<char> = tag.chars().collect();
        mutated[0] = if mutated[0] == 'a' { 'b' } else { 'a' };
        let mutated: String = mutated.into_iter().collect();

        assert!(!authenticate(
            "app-1.2.0.jar",
            1_700_000_000_000,
            1_048_576,
            SALT,
            &mutated
        ));
    }

    #[test]
    fn test_comparison_is_case_sensitive() {
        let tag = compute_tag("app.jar", 1, 2, SALT);
        assert!(!authenticate("app.jar", 1, 2, SALT, &tag.to_uppercase()));
    }

    #[test]
    fn test_wrong_salt_fails() {
        let tag = compute_tag("app.jar", 1, 2, SALT);
        assert!(!authenticate("app.jar", 1, 2, "other-salt", &tag));
    }

    #[test]
    fn test_field_change_invalidates_tag() {
        let tag = compute_tag("app.jar", 1_700_000_000_000, 1_048_576, SALT);
        assert!(!authenticate("app.jar", 1_700_000_000_001, 1_048_576, SALT, &tag));
        assert!(!authenticate("app.jar", 1_700_000_000_000, 1_048_577, SALT, &tag));
        assert!(!authenticate("other.jar", 1_700_000_000_000, 1_048_576, SALT, &tag));
    }

    #[test]
    fn test_malformed_tag_is_just_unauthenticated() {
        assert!(!authenticate("app.jar", 1, 2, SALT, ""));
        assert!(!authenticate("app.jar", 1, 2, SALT, "not-hex-at-all"));
    }

    #[test]
    fn test_tag_shape() {
        let tag = compute_tag("app.jar", 1, 2, SALT);
        assert_eq!(tag.len(), 64); // SHA-256 as hex
        assert!(tag.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(tag, tag.to_lowercase());
    }
}
