//! Salted one-way password hashing with Argon2id

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher as _, PasswordVerifier, Version,
    password_hash::{self, SaltString},
};
#[cfg(test)]
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

/// Argon2 cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordConfig {
    /// Memory cost in KiB
    pub memory_kib: u32,
    /// Number of passes
    pub iterations: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

/// Hashes and verifies passwords; stored hashes are PHC strings
#[derive(Clone)]
pub struct PasswordService {
    params: Params,
    /// Hash of a random password under the configured params, checked in
    /// place of a stored hash when the user does not exist
    dummy_hash: String,
    #[cfg(test)]
    verifications: Arc<AtomicUsize>,
}

impl PasswordService {
    pub fn new(config: PasswordConfig) -> Result<Self, password_hash::Error> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )?;

        let mut service = Self {
            params,
            dummy_hash: String::new(),
            #[cfg(test)]
            verifications: Arc::default(),
        };
        let dummy_password = SaltString::generate(&mut rand::thread_rng());
        service.dummy_hash = service.hash_password(dummy_password.as_str())?;

        Ok(service)
    }

    /// Stand-in hash for logins naming an unknown user
    pub fn dummy_hash(&self) -> &str {
        &self.dummy_hash
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a password with a fresh random salt
    pub fn hash_password(&self, password: &str) -> Result<String, password_hash::Error> {
        let salt = SaltString::generate(&mut rand::thread_rng());
        let hash = self.argon2().hash_password(password.as_bytes(), &salt)?;
        Ok(hash.to_string())
    }

    /// Verify a password against a stored hash.
    ///
    /// The cost parameters are read from the stored hash, so hashes created
    /// under older settings keep verifying.
    pub fn verify_password(
        &self,
        password: &str,
        password_hash: &str,
    ) -> Result<bool, password_hash::Error> {
        #[cfg(test)]
        self.verifications.fetch_add(1, Ordering::SeqCst);

        let parsed_hash = PasswordHash::new(password_hash)?;
        Ok(self
            .argon2()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }
}

#[cfg(test)]
impl PasswordService {
    /// Cheapest valid parameters, keeps hashing fast in tests
    pub(crate) fn for_tests() -> Self {
        Self::new(PasswordConfig {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap()
    }

    /// Number of password verifications run so far, shared across clones
    pub(crate) fn verification_count(&self) -> usize {
        self.verifications.load(Ordering::SeqCst)
    }
}
