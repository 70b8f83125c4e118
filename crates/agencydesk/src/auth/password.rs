//! Admin password hashing.
//!
//! Hashes are encoded as `blake3$<rounds>$<salt>$<hex digest>`. The digest is
//! a blake3 key derivation over salt and password, fed back into itself for
//! `rounds` iterations.

use std::sync::LazyLock;

use crate::error::{Error, Result};

const SCHEME: &str = "blake3";

const DERIVE_CONTEXT: &str = "agencydesk admin password hashing v1";

/// Iterations used for new hashes.
pub const DEFAULT_ROUNDS: u32 = 10_000;

/// Well-formed hash with an all-zero digest that no password derives to.
static PLACEHOLDER_HASH: LazyLock<String> = LazyLock::new(|| {
    format!(
        "{SCHEME}${DEFAULT_ROUNDS}$00000000000000000000000000000000${}",
        "0".repeat(64)
    )
});

/// Hash a password with a fresh random salt.
#[must_use]
pub fn hash_password(password: &str) -> String {
    let salt = uuid::Uuid::new_v4().simple().to_string();
    hash_with_salt(password, &salt, DEFAULT_ROUNDS)
}

fn hash_with_salt(password: &str, salt: &str, rounds: u32) -> String {
    let digest = derive(password, salt, rounds);
    format!("{SCHEME}${rounds}${salt}${}", digest.to_hex())
}

fn derive(password: &str, salt: &str, rounds: u32) -> blake3::Hash {
    let mut hasher = blake3::Hasher::new_derive_key(DERIVE_CONTEXT);
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    let mut digest = hasher.finalize();

    for _ in 1..rounds {
        let mut hasher = blake3::Hasher::new_derive_key(DERIVE_CONTEXT);
        hasher.update(digest.as_bytes());
        hasher.update(salt.as_bytes());
        digest = hasher.finalize();
    }
    digest
}

/// Check a password against an encoded hash.
///
/// Malformed hashes never verify. The digest comparison is constant-time.
#[must_use]
pub fn verify_password(password: &str, encoded: &str) -> bool {
    let mut parts = encoded.split('$');
    let (Some(scheme), Some(rounds), Some(salt), Some(hex), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return false;
    };
    if scheme != SCHEME || salt.is_empty() {
        return false;
    }
    let Ok(rounds) = rounds.parse::<u32>() else {
        return false;
    };
    if rounds == 0 {
        return false;
    }
    let Ok(expected) = blake3::Hash::from_hex(hex) else {
        return false;
    };

    // blake3::Hash equality is constant-time.
    derive(password, salt, rounds) == expected
}

/// Run a full verification against a hash that never matches.
///
/// Login calls this when no account has the given email, so the response
/// takes as long as a wrong password on a real account.
pub fn verify_placeholder(password: &str) {
    std::hint::black_box(verify_password(password, &PLACEHOLDER_HASH));
}

/// Enforce the minimum password length.
///
/// # Errors
///
/// Returns a validation error on the `password` field.
pub fn check_password_strength(password: &str, min_length: usize) -> Result<()> {
    if password.chars().count() < min_length {
        return Err(Error::validation(
            "password",
            format!("must be at least {min_length} characters"),
        ));
    }
    if password.trim().is_empty() {
        return Err(Error::validation("password", "must not be blank"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct horse battery staple");
        assert!(hash.starts_with("blake3$10000$"));
        assert!(verify_password("correct horse battery staple", &hash));
        assert!(!verify_password("correct horse battery stapler", &hash));
    }

    #[test]
    fn test_placeholder_hash_is_well_formed() {
        let real = hash_password("anything");
        let real_parts: Vec<&str> = real.split('$').collect();
        let parts: Vec<&str> = PLACEHOLDER_HASH.split('$').collect();

        assert_eq!(parts.len(), real_parts.len());
        assert_eq!(parts[1], real_parts[1]);
        assert!(blake3::Hash::from_hex(parts[3]).is_ok());
        assert!(!verify_password("", &PLACEHOLDER_HASH));
        assert!(!verify_password("anything", &PLACEHOLDER_HASH));
    }

    #[test]
    fn test_salts_differ() {
        assert_ne!(hash_password("same"), hash_password("same"));
    }

    #[test]
    fn test_deterministic_with_fixed_salt() {
        assert_eq!(
            hash_with_salt("pw", "salt", 3),
            hash_with_salt("pw", "salt", 3)
        );
        assert_ne!(
            hash_with_salt("pw", "salt", 3),
            hash_with_salt("pw", "salt", 4)
        );
    }

    #[test]
    fn test_malformed_hashes_never_verify() {
        for bad in [
            "",
            "plaintext",
            "blake3$10$salt",
            "bcrypt$10$salt$00",
            "blake3$x$salt$00",
            "blake3$0$salt$00",
            "blake3$10$$00",
            "blake3$10$salt$nothex",
            "blake3$10$salt$00$extra",
        ] {
            assert!(!verify_password("pw", bad), "{bad}");
        }
    }

    #[test]
    fn test_check_password_strength() {
        assert!(check_password_strength("longenough", 8).is_ok());
        assert!(check_password_strength("short", 8).is_err());
        assert!(check_password_strength("        ", 8).is_err());
    }
}
