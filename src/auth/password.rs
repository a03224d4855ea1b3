//! Credential hashing and the password policy checker.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use anyhow::anyhow;

use crate::error::ApiError;

/// Check a candidate password against the policy, returning *every* unmet
/// rule rather than stopping at the first.
pub fn policy_violations(password: &str) -> Vec<&'static str> {
    let mut violations = Vec::new();
    if password.chars().count() < 8 {
        violations.push("password must be at least 8 characters long");
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        violations.push("password must contain at least 1 uppercase character");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        violations.push("password must contain at least 1 number");
    }
    if !password.chars().any(|c| !c.is_alphanumeric()) {
        violations.push("password must contain at least 1 special character");
    }
    violations
}

pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(anyhow!("failed to hash password: {e}")))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strong_password_passes() {
        assert!(policy_violations("Yyugbcdasdd@134").is_empty());
    }

    #[test]
    fn test_each_rule_reported_alone() {
        assert_eq!(
            policy_violations("Yd@134"),
            vec!["password must be at least 8 characters long"]
        );
        assert_eq!(
            policy_violations("yyugbcdasdd@134"),
            vec!["password must contain at least 1 uppercase character"]
        );
        assert_eq!(
            policy_violations("Yyugbcdasdd@"),
            vec!["password must contain at least 1 number"]
        );
        assert_eq!(
            policy_violations("Yyugbcdasdd134"),
            vec!["password must contain at least 1 special character"]
        );
    }

    #[test]
    fn test_all_rules_reported_together() {
        let violations = policy_violations("yy");
        assert!(violations.contains(&"password must be at least 8 characters long"));
        assert!(violations.contains(&"password must contain at least 1 uppercase character"));
        assert!(violations.contains(&"password must contain at least 1 number"));
        assert!(violations.contains(&"password must contain at least 1 special character"));
    }

    #[test]
    fn test_hash_round_trip() {
        let hash = hash_password("Yyugbcdasdd@134").unwrap();
        assert_ne!(hash, "Yyugbcdasdd@134");
        assert!(verify_password("Yyugbcdasdd@134", &hash));
        assert!(!verify_password("Wyuxvbtdghsd@765", &hash));
    }

    #[test]
    fn test_malformed_hash_never_verifies() {
        assert!(!verify_password("Yyugbcdasdd@134", "not-a-phc-string"));
    }
}
