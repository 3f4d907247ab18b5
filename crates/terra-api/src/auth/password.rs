use crate::error::ApiError;

/// Hash a password with bcrypt at the configured cost.
pub fn hash_password(password: &str, cost: u32) -> Result<String, ApiError> {
    bcrypt::hash(password, cost).map_err(|e| anyhow::anyhow!("bcrypt hash failed: {e}").into())
}

/// Check a password against a stored bcrypt hash.
///
/// A malformed stored hash counts as a failed verification rather than a
/// server error, so login never leaks which part failed.
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}
