use crate::error::AppError;
use log::warn;

/// bcrypt hasher with a cost fixed at start-up.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        bcrypt::hash(password, self.cost)
            .map_err(|e| AppError::HashingError(format!("Failed to hash password: {}", e)))
    }

    /// Returns `true` only when `password` matches `hashed_password`.
    ///
    /// A malformed hash is reported as a mismatch so callers cannot tell the two apart.
    pub fn verify(&self, hashed_password: &str, password: &str) -> bool {
        match bcrypt::verify(password, hashed_password) {
            Ok(matched) => matched,
            Err(e) => {
                warn!("Stored password hash could not be verified: {}", e);
                false
            }
        }
    }
}
