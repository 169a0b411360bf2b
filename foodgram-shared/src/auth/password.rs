/// Password hashing using Argon2id
///
/// # Parameters
///
/// - Memory: 64 MB
/// - Iterations: 3
/// - Parallelism: 4 lanes
/// - Output: 32-byte hash
///
/// # Example
///
/// ```
/// use foodgram_shared::auth::password::{hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("super_secret_password_123")?;
/// assert!(verify_password("super_secret_password_123", &hash)?);
/// assert!(!verify_password("wrong_password", &hash)?);
/// # Ok(())
/// # }
/// ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder, Version,
};

/// Shortest accepted password
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Longest accepted password
pub const MAX_PASSWORD_LENGTH: usize = 150;

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    HashError(String),

    #[error("Failed to verify password: {0}")]
    VerifyError(String),

    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),
}

/// Hashes a password into a PHC string
///
/// ```text
/// $argon2id$v=19$m=65536,t=3,p=4$<salt>$<hash>
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let params = ParamsBuilder::new()
        .m_cost(65536)
        .t_cost(3)
        .p_cost(4)
        .output_len(32)
        .build()
        .map_err(|e| PasswordError::HashError(format!("Invalid parameters: {}", e)))?;

    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params);

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashError(format!("Hash generation failed: {}", e)))?;

    Ok(password_hash.to_string())
}

/// Verifies a password against a stored hash
///
/// `Ok(false)` on mismatch; `Err` only when the stored hash is unusable.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| PasswordError::InvalidHash(format!("Failed to parse hash: {}", e)))?;

    // Parameters come from the hash itself
    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(_) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(format!("Verification failed: {}", e))),
    }
}

/// Checks a new password before it is hashed
///
/// Rules: between 8 and 150 characters, not only digits, and not the
/// username itself.
///
/// ```
/// use foodgram_shared::auth::password::validate_password_strength;
///
/// assert!(validate_password_strength("pancakes-42", "chef").is_ok());
/// assert!(validate_password_strength("12345678", "chef").is_err());
/// assert!(validate_password_strength("chef", "chef").is_err());
/// ```
pub fn validate_password_strength(password: &str, username: &str) -> Result<(), String> {
    let length = password.chars().count();

    if length < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        ));
    }

    if length > MAX_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at most {} characters long",
            MAX_PASSWORD_LENGTH
        ));
    }

    if password.chars().all(|c| c.is_ascii_digit()) {
        return Err("Password cannot be entirely numeric".to_string());
    }

    if !username.is_empty() && password.eq_ignore_ascii_case(username) {
        return Err("Password is too similar to the username".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password() {
        let hash = hash_password("test_password_123").expect("Hash should succeed");

        assert!(hash.starts_with("$argon2id$"));
        assert!(hash.contains("v=19"));
        assert!(hash.contains("m=65536"));
        assert!(hash.contains("t=3"));
        assert!(hash.contains("p=4"));
    }

    #[test]
    fn test_hash_password_produces_different_salts() {
        let hash1 = hash_password("same_password").unwrap();
        let hash2 = hash_password("same_password").unwrap();
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_verify_password() {
        let hash = hash_password("correct_password").unwrap();

        assert!(verify_password("correct_password", &hash).unwrap());
        assert!(!verify_password("wrong_password", &hash).unwrap());
        assert!(!verify_password("", &hash).unwrap());
    }

    #[test]
    fn test_verify_password_invalid_hash() {
        assert!(verify_password("password", "invalid_hash").is_err());
        assert!(verify_password("password", "$argon2id$invalid").is_err());
    }

    #[test]
    fn test_unicode_password_roundtrip() {
        let hash = hash_password("блины-с-мёдом").unwrap();
        assert!(verify_password("блины-с-мёдом", &hash).unwrap());
    }

    #[test]
    fn test_validate_password_strength() {
        assert!(validate_password_strength("pancakes-42", "chef").is_ok());
        assert!(validate_password_strength("пароль-длинный", "chef").is_ok());

        let err = validate_password_strength("short", "chef").unwrap_err();
        assert!(err.contains("at least 8"));

        let err = validate_password_strength("1234567890", "chef").unwrap_err();
        assert!(err.contains("numeric"));

        let err = validate_password_strength("ChefMaster", "chefmaster").unwrap_err();
        assert!(err.contains("username"));

        let long = "a".repeat(MAX_PASSWORD_LENGTH + 1);
        assert!(validate_password_strength(&long, "chef").is_err());
    }
}
