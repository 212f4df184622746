use crate::error::AppError;
use bcrypt::{hash, verify};

/// Adaptive-hash cost factor; high enough to resist offline brute force.
const BCRYPT_COST: u32 = 10;

/// Hashes a password with the deployment pepper appended before the salted
/// bcrypt pass. The pepper is a server-side secret, distinct from the
/// per-record salt bcrypt generates itself.
pub fn hash_password(password: &str, pepper: &str) -> Result<String, AppError> {
    hash(format!("{}{}", password, pepper), BCRYPT_COST)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

/// Recomputes the peppered hash and compares against the stored one.
pub fn verify_password(password: &str, pepper: &str, hashed: &str) -> Result<bool, AppError> {
    verify(format!("{}{}", password, pepper), hashed)
        .map_err(|e| AppError::Internal(format!("Failed to verify password: {}", e)))
}
