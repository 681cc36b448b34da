//! Password policy and Argon2id verification.
//!
//! Hashing happens in the user repository at creation time; this module
//! only checks candidate passwords against stored PHC strings.

use argon2::{Argon2, PasswordVerifier};

use crate::error::AuthError;

/// Require at least `min_length` characters with a letter, a digit and a
/// special (non-alphanumeric, non-space) character among them.
pub fn check_policy(password: &str, min_length: usize) -> Result<(), AuthError> {
    let long_enough = password.chars().count() >= min_length;
    let has_letter = password.chars().any(char::is_alphabetic);
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password
        .chars()
        .any(|c| !c.is_alphanumeric() && !c.is_whitespace());

    if !(long_enough && has_letter && has_digit && has_special) {
        return Err(AuthError::WeakPassword { min_length });
    }
    Ok(())
}

/// Verify a plaintext password against an Argon2id PHC-format hash.
///
/// If `pepper` is provided it is prepended to the password before
/// verification and must match the pepper used during hashing.
///
/// Returns `Ok(true)` on match, `Ok(false)` on mismatch, or
/// `Err(AuthError::Crypto)` if the stored hash is malformed.
pub fn verify_password(
    password: &str,
    hash: &str,
    pepper: Option<&str>,
) -> Result<bool, AuthError> {
    let peppered: String;
    let input = match pepper {
        Some(p) => {
            peppered = format!("{p}{password}");
            peppered.as_bytes()
        }
        None => password.as_bytes(),
    };

    let parsed_hash = argon2::PasswordHash::new(hash)
        .map_err(|e| AuthError::Crypto(format!("invalid hash format: {e}")))?;

    let argon2 = Argon2::default();
    match argon2.verify_password(input, &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::Crypto(format!("verify error: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argon2::PasswordHasher;
    use argon2::password_hash::SaltString;
    use argon2::password_hash::rand_core::OsRng;

    /// Helper: hash a password with optional pepper using Argon2id.
    fn hash_password(password: &str, pepper: Option<&str>) -> String {
        let peppered: String;
        let input = match pepper {
            Some(p) => {
                peppered = format!("{p}{password}");
                peppered.as_bytes()
            }
            None => password.as_bytes(),
        };
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        argon2
            .hash_password(input, &salt)
            .expect("hashing failed")
            .to_string()
    }

    #[test]
    fn correct_password_matches() {
        let hash = hash_password("correct-horse", None);
        assert!(verify_password("correct-horse", &hash, None).unwrap());
    }

    #[test]
    fn wrong_password_does_not_match() {
        let hash = hash_password("correct-horse", None);
        assert!(!verify_password("wrong", &hash, None).unwrap());
    }

    #[test]
    fn pepper_is_applied() {
        let hash = hash_password("correct-horse", Some("pepper!"));
        assert!(verify_password("correct-horse", &hash, Some("pepper!")).unwrap());
        // Without pepper should fail.
        assert!(!verify_password("correct-horse", &hash, None).unwrap());
    }

    #[test]
    fn short_or_blank_passwords_fail_policy() {
        assert!(check_policy("abc-123", 10).is_err());
        assert!(check_policy("          ", 10).is_err());
        assert!(check_policy("abcd-12345", 10).is_ok());
        // Length counts characters, not bytes.
        assert!(check_policy("éé-1", 5).is_err());
        assert!(check_policy("ééé-1", 5).is_ok());
    }

    #[test]
    fn policy_requires_each_character_class() {
        assert!(check_policy("abcdefghij-", 10).is_err());
        assert!(check_policy("1234567890-", 10).is_err());
        assert!(check_policy("abcde12345", 10).is_err());
        // Whitespace does not count as a special character.
        assert!(check_policy("abcde 12345", 10).is_err());
        assert!(check_policy("abcde_12345", 10).is_ok());
    }

    #[test]
    fn malformed_hash_returns_error() {
        let result = verify_password("pw", "not-a-hash", None);
        assert!(result.is_err());
    }
}
