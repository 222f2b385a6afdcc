use rand::Rng;
use rand::distributions::Alphanumeric;

/// Key length used by backends unless configured otherwise.
///
/// Twelve alphanumeric characters give a 62^12 key space, large enough that
/// random collisions among live entries are negligible.
pub const DEFAULT_KEY_LENGTH: usize = 12;

/// Generate a random key of `length` characters from `[A-Za-z0-9]`.
///
/// Uniqueness is the caller's concern; this is plain uniform sampling.
#[must_use]
pub fn new_key(length: usize) -> String {
    key_from_rng(&mut rand::thread_rng(), length)
}

/// Generate a key from the provided generator.
///
/// Exists so tests can drive a seeded [`rand::rngs::StdRng`] and assert on
/// the key shape deterministically.
pub fn key_from_rng<R: Rng + ?Sized>(rng: &mut R, length: usize) -> String {
    (0..length)
        .map(|_| char::from(rng.sample(Alphanumeric)))
        .collect()
}
