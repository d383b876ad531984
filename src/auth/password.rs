// Password hashing and validation service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

use crate::auth::error::AuthError;

/// Minimum accepted password length, in characters
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Argon2id work factor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCost {
    /// Memory cost in KiB
    pub memory_kib: u32,
    /// Number of passes over memory
    pub iterations: u32,
}

impl Default for HashCost {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
        }
    }
}

/// Password service for hashing and verification
#[derive(Debug, Clone)]
pub struct PasswordService {
    params: Params,
}

impl PasswordService {
    /// Create a password service with the given work factor
    pub fn new(cost: HashCost) -> Result<Self, AuthError> {
        let params = Params::new(cost.memory_kib, cost.iterations, Params::DEFAULT_P_COST, None)
            .map_err(|e| AuthError::Internal(format!("invalid argon2 parameters: {}", e)))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a password using Argon2id with a fresh random salt.
    /// The output is a PHC string carrying the salt and parameters.
    pub fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|_| AuthError::PasswordHash)
    }

    /// Verify a password against a stored hash.
    /// Malformed hashes verify as false.
    pub fn verify_password(&self, password: &str, hash: &str) -> bool {
        let parsed = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(_) => return false,
        };
        // Parameters embedded in the PHC string take precedence over ours
        self.argon2()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    /// Validate password strength requirements
    pub fn validate_password_strength(password: &str) -> Result<(), AuthError> {
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::InvalidInput(format!(
                "Password must be at least {} characters long",
                MIN_PASSWORD_LENGTH
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // Cheap parameters keep the suite fast
    fn test_password_service() -> PasswordService {
        PasswordService::new(HashCost {
            memory_kib: 64,
            iterations: 1,
        })
        .unwrap()
    }

    #[test]
    fn test_hash_is_not_plaintext() {
        let service = test_password_service();
        let hash = service.hash_password("secret1").unwrap();
        assert_ne!(hash, "secret1");
        assert!(hash.starts_with("$argon2id$"));
    }

    #[test]
    fn test_hash_is_salted() {
        let service = test_password_service();
        let first = service.hash_password("secret1").unwrap();
        let second = service.hash_password("secret1").unwrap();
        assert_ne!(first, second);
        assert!(service.verify_password("secret1", &first));
        assert!(service.verify_password("secret1", &second));
    }

    #[test]
    fn test_wrong_password_rejected() {
        let service = test_password_service();
        let hash = service.hash_password("secret1").unwrap();
        assert!(!service.verify_password("secret2", &hash));
        assert!(!service.verify_password("", &hash));
    }

    #[test]
    fn test_malformed_hash_verifies_false() {
        let service = test_password_service();
        assert!(!service.verify_password("secret1", ""));
        assert!(!service.verify_password("secret1", "not-a-phc-string"));
        assert!(!service.verify_password("secret1", "$2b$12$abcdefghijklmnopqrstuv"));
    }

    #[test]
    fn test_hash_from_other_cost_still_verifies() {
        let cheap = test_password_service();
        let other = PasswordService::new(HashCost {
            memory_kib: 128,
            iterations: 2,
        })
        .unwrap();
        let hash = other.hash_password("secret1").unwrap();
        assert!(cheap.verify_password("secret1", &hash));
    }

    #[test]
    fn test_invalid_cost_rejected() {
        let result = PasswordService::new(HashCost {
            memory_kib: 1,
            iterations: 0,
        });
        assert!(matches!(result, Err(AuthError::Internal(_))));
    }

    #[test]
    fn test_password_strength() {
        assert!(PasswordService::validate_password_strength("secret").is_ok());
        assert!(PasswordService::validate_password_strength("12345").is_err());
        assert!(PasswordService::validate_password_strength("").is_err());
        // Length counts characters, not bytes
        assert!(PasswordService::validate_password_strength("ééééé").is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_only_original_password_verifies(
            password in "[a-zA-Z0-9]{6,20}",
            other in "[a-zA-Z0-9]{6,20}"
        ) {
            let service = test_password_service();
            let hash = service.hash_password(&password)?;
            prop_assert!(service.verify_password(&password, &hash));
            if other != password {
                prop_assert!(!service.verify_password(&other, &hash));
            }
        }
    }
}
