/// Password hashing and verification
///
/// One-way credential hashing via bcrypt. Strength policy (length bounds)
/// lives in `validators`; this module only hashes and compares.

use bcrypt::{hash, verify};

use crate::error::AppError;

// bcrypt work factor used by the registration flow
const BCRYPT_COST: u32 = 12;

/// Hash a password with bcrypt.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, BCRYPT_COST)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// Verify a password against its stored hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    verify(password, hash)
        .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))
}
