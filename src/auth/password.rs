use bcrypt::{hash, verify, DEFAULT_COST};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("le mot de passe doit contenir au moins {0} caractères")]
    TooShort(usize),
    #[error("le mot de passe ne doit pas dépasser {0} caractères")]
    TooLong(usize),
    #[error("le mot de passe doit contenir au moins une majuscule")]
    NoUppercase,
    #[error("le mot de passe doit contenir au moins une minuscule")]
    NoLowercase,
    #[error("le mot de passe doit contenir au moins un chiffre")]
    NoNumber,
    #[error("Failed to hash password")]
    HashingFailed,
    #[error("Failed to verify password")]
    VerificationFailed,
}

/// Password strength requirements
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub max_length: usize,
    pub require_uppercase: bool,
    pub require_lowercase: bool,
    pub require_number: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 128,
            require_uppercase: false,
            require_lowercase: false,
            require_number: false,
        }
    }
}

impl PasswordPolicy {
    pub fn validate(&self, password: &str) -> Result<(), PasswordError> {
        let length = password.chars().count();
        if length < self.min_length {
            return Err(PasswordError::TooShort(self.min_length));
        }

        if length > self.max_length {
            return Err(PasswordError::TooLong(self.max_length));
        }

        if self.require_uppercase && !password.chars().any(|c| c.is_uppercase()) {
            return Err(PasswordError::NoUppercase);
        }

        if self.require_lowercase && !password.chars().any(|c| c.is_lowercase()) {
            return Err(PasswordError::NoLowercase);
        }

        if self.require_number && !password.chars().any(|c| c.is_numeric()) {
            return Err(PasswordError::NoNumber);
        }

        Ok(())
    }
}

/// Hash a password using bcrypt
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    hash(password, DEFAULT_COST).map_err(|_| PasswordError::HashingFailed)
}

/// Verify a password against its hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    verify(password, hash).map_err(|_| PasswordError::VerificationFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = PasswordPolicy::default();

        assert!(matches!(policy.validate("court"), Err(PasswordError::TooShort(8))));
        assert!(matches!(
            policy.validate(&"a".repeat(129)),
            Err(PasswordError::TooLong(128))
        ));
        assert!(policy.validate("learner123").is_ok());
        assert!(policy.validate("moiuniquement").is_ok());
    }

    #[test]
    fn test_length_counts_characters() {
        // 8 characters, more than 8 bytes
        assert!(PasswordPolicy::default().validate("éééééééé").is_ok());
    }

    #[test]
    fn test_strict_policy() {
        let policy = PasswordPolicy {
            require_uppercase: true,
            require_lowercase: true,
            require_number: true,
            ..PasswordPolicy::default()
        };

        assert!(matches!(policy.validate("lowercase123"), Err(PasswordError::NoUppercase)));
        assert!(matches!(policy.validate("UPPERCASE123"), Err(PasswordError::NoLowercase)));
        assert!(matches!(policy.validate("Passwordxx"), Err(PasswordError::NoNumber)));
        assert!(policy.validate("Password123").is_ok());
    }

    #[test]
    fn test_password_hashing() {
        let password = "johndoe123";
        let hash = hash_password(password).unwrap();

        assert!(verify_password(password, &hash).unwrap());
        assert!(!verify_password("wrongpass", &hash).unwrap());
    }

    #[test]
    fn test_verify_against_garbage_hash() {
        assert!(verify_password("johndoe123", "not-a-bcrypt-hash").is_err());
    }
}
