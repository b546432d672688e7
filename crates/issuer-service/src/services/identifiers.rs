//! Room and participant name generation.
//!
//! Names are a fixed prefix plus a short random suffix. Suffixes come from a
//! [`SuffixGenerator`] so the randomness source (or a future registry-backed
//! collision check) can change without touching the issuer.
//!
//! Uniqueness is probabilistic only: 36^7 (~7.8e10) suffixes, no dedup.

use common::types::{PARTICIPANT_NAME_PREFIX, ROOM_NAME_PREFIX};
use rand::seq::SliceRandom;

/// Length of the random suffix on generated names.
pub const SUFFIX_LENGTH: usize = 7;

/// Suffix alphabet: lowercase ASCII letters and digits.
pub const SUFFIX_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Source of random name suffixes.
pub trait SuffixGenerator: Send + Sync {
    /// Produce a suffix of exactly `len` characters from [`SUFFIX_ALPHABET`].
    fn suffix(&self, len: usize) -> String;
}

/// Non-cryptographic suffixes from the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomSuffix;

impl SuffixGenerator for RandomSuffix {
    fn suffix(&self, len: usize) -> String {
        let mut rng = rand::thread_rng();
        (0..len)
            .filter_map(|_| SUFFIX_ALPHABET.choose(&mut rng))
            .map(|&b| char::from(b))
            .collect()
    }
}

/// Generate a room name (`voice-room-xxxxxxx`).
pub fn room_name(generator: &dyn SuffixGenerator) -> String {
    format!("{}{}", ROOM_NAME_PREFIX, generator.suffix(SUFFIX_LENGTH))
}

/// Generate a participant identity (`user-xxxxxxx`).
pub fn participant_name(generator: &dyn SuffixGenerator) -> String {
    format!("{}{}", PARTICIPANT_NAME_PREFIX, generator.suffix(SUFFIX_LENGTH))
}
