use rand::{rng, Rng};

/// URL-safe base62 alphabet (0-9, A-Z, a-z)
pub const CHARSET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Generates a random short ID of exactly `length` base62 characters.
/// Each character is drawn independently and uniformly.
pub fn generate_short_id(length: usize) -> String {
    let mut rng = rng();
    (0..length)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}
