//! Seed strings and RNG derivation.
//!
//! A simulation is fully reproducible from `(rows, cols, seed)`: the seed
//! string is hashed to a 64-bit value that seeds the grid's single ChaCha
//! generator, and every random draw flows from it in a fixed order.

use rand::Rng;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Characters a generated seed is drawn from
pub const SEED_ALPHABET: &str = "1234567890abcdefghABCDEFGHQWERTYqwerty";

/// Length of a generated seed string
pub const SEED_LENGTH: usize = 20;

/// Generate a fresh random seed string from OS entropy
pub fn generate_seed() -> String {
    let mut rng = rand::thread_rng();
    let chars = SEED_ALPHABET.as_bytes();
    (0..SEED_LENGTH)
        .map(|_| chars[rng.gen_range(0..chars.len())] as char)
        .collect()
}

/// Derive the 64-bit RNG seed for a seed string
pub fn derive_rng_seed(seed: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    seed.hash(&mut hasher);
    hasher.finish()
}
