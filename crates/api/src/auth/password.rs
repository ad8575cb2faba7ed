use bcrypt::{hash, verify, DEFAULT_COST};

use crate::error::AppError;

pub struct PasswordService;

impl PasswordService {
    pub fn hash_password(password: &str) -> Result<String, AppError> {
        hash(password, DEFAULT_COST).map_err(|e| AppError::Internal(e.to_string()))
    }

    /// A malformed stored hash counts as a mismatch.
    pub fn verify_password(password: &str, password_hash: &str) -> bool {
        verify(password, password_hash).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifies_only_the_original_password() {
        let hashed = PasswordService::hash_password("hunter22").unwrap();

        assert!(PasswordService::verify_password("hunter22", &hashed));
        assert!(!PasswordService::verify_password("hunter23", &hashed));
        assert!(!PasswordService::verify_password("hunter22", "not-a-hash"));
    }
}
