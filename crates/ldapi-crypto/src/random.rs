//! Salt generation.

use rand::Rng;

/// Alphabet salts are drawn from.
pub const SALT_ALPHABET: &[u8] = b"0123456789abcdef";

/// Default salt length for `{SSHA}` hashes.
pub const DEFAULT_SALT_LEN: usize = 10;

/// Generates a random salt of `len` lowercase hex characters.
///
/// The salt is ASCII so the resulting `{SSHA}` value can be verified by
/// tools that treat the salt as text.
#[must_use]
pub fn generate_salt(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| char::from(SALT_ALPHABET[rng.random_range(0..SALT_ALPHABET.len())]))
        .collect()
}
