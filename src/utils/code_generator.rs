//! Short code generation.
//!
//! Codes are fixed-length strings over a URL-safe alphabet, drawn from a
//! seeded RNG stream so a given `(seed, worker_id)` pair replays the same
//! sequence across restarts. Uniqueness against the store is NOT guaranteed
//! here; the repository's insert contract enforces it, and the resolver
//! retries generation on collision.

use rand::{Rng, SeedableRng, rngs::StdRng};
use std::sync::Mutex;

/// URL-safe alphabet: 64 characters, no padding or percent-encoding needed.
pub const DEFAULT_ALPHABET: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// Default code length. 64^9 possible codes keeps the collision rate
/// negligible at any realistic link volume.
pub const DEFAULT_CODE_LENGTH: usize = 9;

#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error("alphabet must contain at least two distinct characters")]
    AlphabetTooSmall,
    #[error("code length must be greater than zero")]
    ZeroLength,
    #[error("generator state lock poisoned")]
    StatePoisoned,
}

/// Deterministic short code generator.
///
/// The RNG stream sits behind a `Mutex` so concurrent callers never observe
/// or produce the same stream position twice.
pub struct CodeGenerator {
    alphabet: Vec<char>,
    length: usize,
    rng: Mutex<StdRng>,
}

impl CodeGenerator {
    /// Creates a generator from its `(seed, worker_id, alphabet, length)`
    /// configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError`] when the alphabet is degenerate or the
    /// length is zero.
    pub fn new(
        seed: u64,
        worker_id: u8,
        alphabet: &str,
        length: usize,
    ) -> Result<Self, GeneratorError> {
        let alphabet: Vec<char> = alphabet.chars().collect();
        if alphabet.len() < 2 {
            return Err(GeneratorError::AlphabetTooSmall);
        }
        if length == 0 {
            return Err(GeneratorError::ZeroLength);
        }

        // Fold the worker id into the high bits so workers sharing a seed
        // still draw disjoint streams.
        let stream_seed = seed ^ ((worker_id as u64) << 56);

        Ok(Self {
            alphabet,
            length,
            rng: Mutex::new(StdRng::seed_from_u64(stream_seed)),
        })
    }

    /// Generator with the default alphabet and length.
    pub fn with_defaults(seed: u64, worker_id: u8) -> Result<Self, GeneratorError> {
        Self::new(seed, worker_id, DEFAULT_ALPHABET, DEFAULT_CODE_LENGTH)
    }

    /// Produces the next code in the stream.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::StatePoisoned`] if a previous caller
    /// panicked while holding the state lock.
    pub fn generate(&self) -> Result<String, GeneratorError> {
        let mut rng = self.rng.lock().map_err(|_| GeneratorError::StatePoisoned)?;

        let mut code = String::with_capacity(self.length);
        for _ in 0..self.length {
            let idx = rng.random_range(0..self.alphabet.len());
            code.push(self.alphabet[idx]);
        }
        Ok(code)
    }

    /// The configured code length.
    pub fn code_length(&self) -> usize {
        self.length
    }
}
