//! Deterministic resource naming derived from a tenant subdomain.
//!
//! Every component that turns a subdomain into a schema or bucket name goes
//! through this module, so create/drop and create/delete pairs always agree
//! on the resource they address.

use crate::error::{ValidationError, ValidationResult};

/// Prefix applied to every tenant schema.
pub const SCHEMA_PREFIX: &str = "tenant_";
/// Prefix applied to every tenant bucket.
pub const BUCKET_PREFIX: &str = "tenant-";
/// Suffix applied to every tenant bucket.
pub const BUCKET_SUFFIX: &str = "-assets";

/// Minimum subdomain length after sanitization.
pub const MIN_SUBDOMAIN_LEN: usize = 3;
/// Maximum subdomain length after sanitization.
pub const MAX_SUBDOMAIN_LEN: usize = 30;
/// Maximum derived schema name length, prefix included.
pub const MAX_SCHEMA_NAME_LEN: usize = 50;
/// Storage backends cap bucket names at 63 characters.
pub const MAX_BUCKET_NAME_LEN: usize = 63;

/// Normalizes a raw subdomain: trims whitespace, lowercases, and rejects
/// anything outside `[a-z0-9-]` or the 3..=30 length bounds.
///
/// Idempotent: sanitizing an already-sanitized value is a no-op.
pub fn sanitize_subdomain(raw: &str) -> ValidationResult<String> {
    let sanitized = raw.trim().to_lowercase();

    if sanitized
        .chars()
        .any(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'))
    {
        return Err(ValidationError::InvalidCharacters(sanitized));
    }
    if sanitized.len() < MIN_SUBDOMAIN_LEN {
        return Err(ValidationError::TooShort(sanitized));
    }
    if sanitized.len() > MAX_SUBDOMAIN_LEN {
        return Err(ValidationError::TooLong(sanitized));
    }

    Ok(sanitized)
}

/// Derives the Postgres schema name for a subdomain.
///
/// A sanitized value that begins with a digit gains a leading underscore
/// before the `tenant_` prefix is applied, keeping the name a valid
/// unquoted identifier.
pub fn schema_name(subdomain: &str) -> ValidationResult<String> {
    let sanitized = sanitize_subdomain(subdomain)?;

    let name = if sanitized.starts_with(|c: char| c.is_ascii_digit()) {
        format!("{SCHEMA_PREFIX}_{sanitized}")
    } else {
        format!("{SCHEMA_PREFIX}{sanitized}")
    };

    if name.len() > MAX_SCHEMA_NAME_LEN {
        return Err(ValidationError::SchemaNameTooLong(name));
    }

    Ok(name)
}

/// Derives the asset bucket name for a subdomain.
///
/// Hyphens are stripped from the sanitized subdomain so the `tenant-` and
/// `-assets` separators stay unambiguous, and the result is truncated to the
/// backend's 63-character limit. Truncation is part of the mapping: create
/// and delete both pass through here and land on the same name.
pub fn bucket_name(subdomain: &str) -> ValidationResult<String> {
    let sanitized = sanitize_subdomain(subdomain)?;
    let flattened = sanitized.replace('-', "");

    let mut name = format!("{BUCKET_PREFIX}{flattened}{BUCKET_SUFFIX}");
    name.truncate(MAX_BUCKET_NAME_LEN);

    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_trims_and_lowercases() {
        assert_eq!(sanitize_subdomain("  Coffee-Beans ").unwrap(), "coffee-beans");
        assert_eq!(sanitize_subdomain("shop42").unwrap(), "shop42");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let once = sanitize_subdomain("Coffee-Beans").unwrap();
        let twice = sanitize_subdomain(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_sanitize_rejects_invalid_characters() {
        for bad in ["caf\u{e9}", "my_shop", "a b c", "shop!", "dot.com"] {
            assert!(matches!(
                sanitize_subdomain(bad),
                Err(ValidationError::InvalidCharacters(_))
            ));
        }
    }

    #[test]
    fn test_sanitize_length_bounds() {
        assert!(matches!(
            sanitize_subdomain("ab"),
            Err(ValidationError::TooShort(_))
        ));
        assert!(sanitize_subdomain("abc").is_ok());
        assert!(sanitize_subdomain(&"a".repeat(30)).is_ok());
        assert!(matches!(
            sanitize_subdomain(&"a".repeat(31)),
            Err(ValidationError::TooLong(_))
        ));
    }

    #[test]
    fn test_schema_name_basic() {
        assert_eq!(schema_name("coffee-beans").unwrap(), "tenant_coffee-beans");
    }

    #[test]
    fn test_schema_name_digit_prefix() {
        assert_eq!(schema_name("9lives").unwrap(), "tenant__9lives");
    }

    #[test]
    fn test_schema_name_deterministic() {
        assert_eq!(
            schema_name("Coffee-Beans").unwrap(),
            schema_name("coffee-beans").unwrap()
        );
    }

    #[test]
    fn test_bucket_name_strips_hyphens() {
        assert_eq!(
            bucket_name("coffee-beans").unwrap(),
            "tenant-coffeebeans-assets"
        );
    }

    #[test]
    fn test_bucket_name_truncated_to_backend_limit() {
        let long = "a".repeat(30);
        let name = bucket_name(&long).unwrap();
        assert!(name.len() <= MAX_BUCKET_NAME_LEN);
        // Same input always truncates to the same name.
        assert_eq!(name, bucket_name(&long).unwrap());
    }

    #[test]
    fn test_bucket_name_within_limit_keeps_suffix() {
        assert_eq!(bucket_name("shop42").unwrap(), "tenant-shop42-assets");
    }
}
