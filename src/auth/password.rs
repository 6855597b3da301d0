use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_hash_verifies_the_signup_password() {
        let hash = hash_password("harvest-season-2024").expect("hash");
        assert!(verify_password("harvest-season-2024", &hash).expect("verify"));
    }

    #[test]
    fn near_miss_password_is_rejected_without_error() {
        let hash = hash_password("investor-pass-9").expect("hash");
        assert!(!verify_password("investor-pass-8", &hash).expect("verify"));
        assert!(!verify_password("", &hash).expect("verify"));
    }

    #[test]
    fn salting_keeps_equal_passwords_distinct_in_the_store() {
        let first = hash_password("shared-password").expect("hash");
        let second = hash_password("shared-password").expect("hash");
        assert_ne!(first, second);
        assert!(verify_password("shared-password", &first).expect("verify"));
        assert!(verify_password("shared-password", &second).expect("verify"));
    }

    #[test]
    fn malformed_stored_hash_is_an_error_not_a_match() {
        assert!(verify_password("anything", "plaintext-left-in-column").is_err());
    }
}
