use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use rand::rngs::OsRng;

/// Hash a password using `Argon2id`.
///
/// # Errors
///
/// Returns an error if hashing fails.
pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;
    Ok(hash.to_string())
}

/// Verify a password against an `Argon2id` hash.
///
/// # Errors
///
/// Returns an error if the stored hash is not a valid PHC string.
pub fn verify_password(password: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| anyhow::anyhow!("Invalid password hash: {e}"))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Validate password strength.
///
/// Requirements: 8 to 128 characters with at least one uppercase letter, one lowercase
/// letter, one digit and one character that is none of those.
///
/// # Errors
///
/// Returns the first rule the password breaks.
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.chars().count() < 8 {
        return Err("Password must be at least 8 characters".to_string());
    }
    if password.chars().count() > 128 {
        return Err("Password must be at most 128 characters".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err("Password must include an uppercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err("Password must include a lowercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("Password must include a number".to_string());
    }
    if password.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err("Password must include a special character".to_string());
    }
    Ok(())
}

/// Validate email format (basic check for `@` and non-empty parts).
///
/// # Errors
///
/// Returns a descriptive error message if the email is invalid.
pub fn validate_email(email: &str) -> Result<(), String> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return Err("Email is required".to_string());
    }
    let parts: Vec<&str> = trimmed.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() || !parts[1].contains('.') {
        return Err("Invalid email address".to_string());
    }
    Ok(())
}

/// Validate a required person name (first or last), 1 to 100 characters.
///
/// # Errors
///
/// Returns a message naming `label` when the name is empty or too long.
pub fn validate_name(label: &str, name: &str) -> Result<(), String> {
    let len = name.trim().chars().count();
    if len == 0 {
        return Err(format!("{label} is required"));
    }
    if len > 100 {
        return Err(format!("{label} is too long"));
    }
    Ok(())
}
