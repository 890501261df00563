use argon2::{
    Algorithm, Argon2, Params, ParamsBuilder, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use password_hash::Error as PasswordHashError;
use rand::{TryRngCore, rngs::OsRng};
use thiserror::Error;

/// Password hashing for account credentials.
///
/// Argon2id with a per-password random salt; the output is a PHC string
/// suitable for storage, and verification runs through the library's own
/// comparison rather than any string equality.
#[derive(Debug)]
pub struct PasswordCrypto {
    argon2: Argon2<'static>,
}

#[derive(Debug, Error)]
pub enum PasswordCryptoError {
    #[error("invalid Argon2 parameters: {0}")]
    InvalidParams(String),
    #[error("password hashing error: {0}")]
    Hash(String),
}

impl From<PasswordHashError> for PasswordCryptoError {
    fn from(err: PasswordHashError) -> Self {
        PasswordCryptoError::Hash(err.to_string())
    }
}

impl PasswordCrypto {
    /// Defaults target ~19 MiB and 2 iterations, the current OWASP baseline
    /// for interactive logins.
    const DEFAULT_MEMORY_KIB: u32 = 19 * 1024;
    const DEFAULT_ITERATIONS: u32 = 2;
    const DEFAULT_PARALLELISM: u32 = 1;
    const SALT_LENGTH: usize = password_hash::Salt::RECOMMENDED_LENGTH;

    pub fn new() -> Result<Self, PasswordCryptoError> {
        let params = ParamsBuilder::new()
            .m_cost(Self::DEFAULT_MEMORY_KIB)
            .t_cost(Self::DEFAULT_ITERATIONS)
            .p_cost(Self::DEFAULT_PARALLELISM)
            .output_len(32)
            .build()
            .map_err(|err| PasswordCryptoError::InvalidParams(err.to_string()))?;
        Ok(Self::with_params(params))
    }

    /// Caller-specified Argon2 parameters (integration tests, constrained
    /// environments).
    pub fn with_params(params: Params) -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::default(), params),
        }
    }

    /// Hash a password with a fresh random salt, returning the PHC string.
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordCryptoError> {
        // Salt via the workspace's rand crate rather than password_hash's
        // optional rand_core shim.
        let mut salt_bytes = [0u8; Self::SALT_LENGTH];
        OsRng
            .try_fill_bytes(&mut salt_bytes)
            .map_err(|err| PasswordCryptoError::Hash(err.to_string()))?;
        let salt = SaltString::encode_b64(&salt_bytes).map_err(PasswordCryptoError::from)?;

        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)?
            .to_string();
        Ok(hash)
    }

    /// Verify a password against a stored PHC hash.
    pub fn verify_password(
        &self,
        password: &str,
        password_hash: &str,
    ) -> Result<bool, PasswordCryptoError> {
        let parsed = PasswordHash::new(password_hash)?;
        Ok(self
            .argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}
