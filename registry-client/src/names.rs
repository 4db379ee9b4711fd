//! Repository names and references, checked before they are put into a path.

use crate::error::{RegistryError, RegistryResult};

const MAX_TAG_LENGTH: usize = 128;

/// Validate a repository name such as `library/alpine`.
///
/// Path components are lowercase alphanumerics separated by `.`, `_` or `-`.
pub(crate) fn validate_repository(name: &str) -> RegistryResult<()> {
    let valid = !name.is_empty()
        && name.split('/').all(|component| {
            !component.is_empty()
                && component.starts_with(|c: char| c.is_ascii_lowercase() || c.is_ascii_digit())
                && component.ends_with(|c: char| c.is_ascii_lowercase() || c.is_ascii_digit())
                && component.chars().all(|c| {
                    c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '_' | '-')
                })
        });

    if valid {
        Ok(())
    } else {
        Err(RegistryError::InvalidName(name.to_owned()))
    }
}

/// Validate a manifest reference: a tag (`v1.2`) or a digest (`sha256:abc...`).
pub(crate) fn validate_reference(reference: &str) -> RegistryResult<()> {
    let valid = match reference.split_once(':') {
        Some((algorithm, encoded)) => {
            !algorithm.is_empty()
                && !encoded.is_empty()
                && algorithm.chars().all(|c| {
                    c.is_ascii_lowercase()
                        || c.is_ascii_digit()
                        || matches!(c, '+' | '.' | '_' | '-')
                })
                && encoded
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '=' | '_' | '-'))
        }
        None => {
            reference.len() <= MAX_TAG_LENGTH
                && reference.starts_with(|c: char| c.is_ascii_alphanumeric() || c == '_')
                && reference
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        }
    };

    if valid {
        Ok(())
    } else {
        Err(RegistryError::InvalidName(reference.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repositories() {
        for name in ["alpine", "library/alpine", "my-org/app.server_v2", "a/b/c"] {
            assert!(validate_repository(name).is_ok(), "{name:?} should be valid");
        }

        for name in ["", "/alpine", "alpine/", "a//b", "..", "../etc", "Alpine", "a b", "app-"] {
            assert!(validate_repository(name).is_err(), "{name:?} should be invalid");
        }
    }

    #[test]
    fn references() {
        for reference in ["latest", "v1.2.3", "_build-7", "sha256:0123abcdef"] {
            assert!(validate_reference(reference).is_ok(), "{reference:?} should be valid");
        }

        let long = "a".repeat(MAX_TAG_LENGTH + 1);
        for reference in ["", ".hidden", "-x", "a/b", "../x", "sha256:", ":abc", long.as_str()] {
            assert!(validate_reference(reference).is_err(), "{reference:?} should be invalid");
        }
    }
}
