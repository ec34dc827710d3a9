//! Random one-time credential generation.

use rand::rngs::OsRng;
use rand::Rng;

/// Excludes 0, O, I and 1 to avoid visual ambiguity in emails.
pub const PASSCODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
pub const PASSCODE_LENGTH: usize = 6;

const RESET_TOKEN_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
pub const RESET_TOKEN_LENGTH: usize = 20;

/// Generates a 6-character email verification passcode.
pub fn generate_passcode() -> String {
    random_string(PASSCODE_ALPHABET, PASSCODE_LENGTH)
}

/// Generates a 20-character opaque password-reset token.
pub fn generate_reset_token() -> String {
    random_string(RESET_TOKEN_ALPHABET, RESET_TOKEN_LENGTH)
}

fn random_string(alphabet: &[u8], length: usize) -> String {
    let mut rng = OsRng;
    (0..length)
        .map(|_| alphabet[rng.gen_range(0..alphabet.len())] as char)
        .collect()
}
