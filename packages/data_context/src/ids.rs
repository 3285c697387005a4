use std::fmt;

use rand::Rng;
use rand::rngs::ThreadRng;

/// Source of candidate identifiers for new models.
///
/// Candidates do not need to be unique. The [`DataContext`][crate::DataContext] rejects the ones
/// already in use and asks for another, up to its attempt budget.
#[cfg_attr(test, mockall::automock)]
pub trait IdGenerator {
    /// Produces a candidate identifier.
    fn generate(&mut self) -> String;
}

/// Generates identifiers from 128 random bits, rendered as 32 lowercase hexadecimal digits.
pub struct RandomIds {
    rng: ThreadRng,
}

impl RandomIds {
    /// Creates a generator backed by the thread-local random number generator.
    #[must_use]
    pub fn new() -> Self {
        Self { rng: rand::rng() }
    }
}

impl IdGenerator for RandomIds {
    fn generate(&mut self) -> String {
        format!("{:032x}", self.rng.random::<u128>())
    }
}

impl Default for RandomIds {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RandomIds {
    #[cfg_attr(test, mutants::skip)] // No API contract.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RandomIds").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn random_ids_are_32_lowercase_hex_digits() {
        let mut ids = RandomIds::new();

        for _ in 0..100 {
            let id = ids.generate();

            assert_eq!(id.len(), 32);
            assert!(
                id.chars()
                    .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
            );
        }
    }

    #[test]
    fn random_ids_differ() {
        let mut ids = RandomIds::new();

        assert_ne!(ids.generate(), ids.generate());
    }
}
