//! Credential hashing - Argon2id hashing and verification of secrets.
//!
//! The same primitive protects login passwords and stored refresh tokens.
//! Each call to [`SecretHasher::hash`] draws a fresh salt, so two hashes of
//! the same secret never compare equal as strings.

use std::fmt;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

use crate::constants::MIN_PASSWORD_LENGTH;
use crate::error::{DomainError, DomainResult};

/// Argon2 cost parameters, loaded from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCost {
    /// Memory cost in KiB
    pub memory_kib: u32,
    /// Number of passes
    pub iterations: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

impl Default for HashCost {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

impl HashCost {
    /// Build Argon2 parameters, rejecting values outside Argon2's bounds.
    pub fn params(&self) -> DomainResult<Params> {
        Params::new(self.memory_kib, self.iterations, self.parallelism, None)
            .map_err(|e| DomainError::InvalidHashCost(e.to_string()))
    }
}

/// Salted one-way hashing of secrets (passwords, refresh tokens).
#[derive(Clone)]
pub struct SecretHasher {
    argon2: Argon2<'static>,
}

impl fmt::Debug for SecretHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretHasher")
            .field("params", self.argon2.params())
            .finish()
    }
}

impl SecretHasher {
    /// Create a hasher with the given cost.
    pub fn new(cost: HashCost) -> DomainResult<Self> {
        let params = cost.params()?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash a secret with a freshly generated salt.
    pub fn hash(&self, secret: &str) -> DomainResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(secret.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| DomainError::hashing(e.to_string()))
    }

    /// Hash `value` unless it already is an Argon2 PHC string.
    pub fn hash_if_plain(&self, value: &str) -> DomainResult<String> {
        if Self::is_hashed(value) {
            Ok(value.to_string())
        } else {
            self.hash(value)
        }
    }

    /// Verify a secret against a stored hash.
    ///
    /// Malformed hashes verify as `false`. The parameters embedded in the
    /// stored hash are used, so hashes created under an older cost still
    /// verify after the configured cost changes.
    pub fn verify(&self, secret: &str, hash: &str) -> bool {
        match PasswordHash::new(hash) {
            Ok(parsed) => self
                .argon2
                .verify_password(secret.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }

    /// Whether `value` is a complete Argon2 PHC string (algorithm, salt and
    /// hash output all present).
    pub fn is_hashed(value: &str) -> bool {
        match PasswordHash::new(value) {
            Ok(parsed) => {
                matches!(parsed.algorithm.as_str(), "argon2id" | "argon2i" | "argon2d")
                    && parsed.salt.is_some()
                    && parsed.hash.is_some()
            }
            Err(_) => false,
        }
    }
}

/// Password value object: a hash that is guaranteed to come from a secret
/// satisfying the password policy.
#[derive(Clone, PartialEq, Eq)]
pub struct Password {
    hash: String,
}

// Don't expose hash in debug output
impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Password")
            .field("hash", &"[REDACTED]")
            .finish()
    }
}

impl Password {
    /// Validate and hash a plaintext password.
    ///
    /// # Errors
    /// Returns [`DomainError::Password`] if the password is shorter than
    /// [`MIN_PASSWORD_LENGTH`].
    pub fn new(plain_text: &str, hasher: &SecretHasher) -> DomainResult<Self> {
        if (plain_text.chars().count() as u64) < MIN_PASSWORD_LENGTH {
            return Err(DomainError::password(format!(
                "Password must be at least {} characters long",
                MIN_PASSWORD_LENGTH
            )));
        }

        Ok(Self {
            hash: hasher.hash(plain_text)?,
        })
    }

    /// Wrap an existing hash (from database).
    pub fn from_hash(hash: impl Into<String>) -> Self {
        Self { hash: hash.into() }
    }

    /// Get the hash string for storage.
    pub fn as_str(&self) -> &str {
        &self.hash
    }

    /// Consume and return the hash string.
    pub fn into_string(self) -> String {
        self.hash
    }

    /// Verify a plaintext password against this hash.
    pub fn verify(&self, plain_text: &str, hasher: &SecretHasher) -> bool {
        hasher.verify(plain_text, &self.hash)
    }
}

impl From<Password> for String {
    fn from(password: Password) -> Self {
        password.hash
    }
}
