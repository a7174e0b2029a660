//! Identifier Generator
//!
//! Issues the short public identifiers that name bindings. Uniqueness for
//! the process lifetime is guaranteed here, not by the registry: the
//! generator remembers every identifier it has handed out and retries on
//! collision, so concurrent provisioning sessions never share an id.

use dashmap::DashMap;
use rand::distributions::Alphanumeric;
use rand::Rng;

/// Length of generated identifiers. 62^9 candidates make retries
/// vanishingly rare while staying short enough to type.
const ID_LENGTH: usize = 9;

/// Process-local generator of unique, URL-path-safe identifiers.
pub struct IdGenerator {
    issued: DashMap<String, ()>,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self {
            issued: DashMap::new(),
        }
    }

    /// Generate a fresh identifier, distinct from every previous one.
    pub fn generate(&self) -> String {
        loop {
            let candidate: String = rand::thread_rng()
                .sample_iter(&Alphanumeric)
                .take(ID_LENGTH)
                .map(char::from)
                .collect();

            if self.issued.insert(candidate.clone(), ()).is_none() {
                return candidate;
            }
        }
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
