//! Random secrets for generated files and CI variables.

use uuid::Uuid;

/// Length of the Django secret key written to `.env`.
pub const SECRET_KEY_LENGTH: usize = 50;

/// Length of generated service passwords.
pub const PASSWORD_LENGTH: usize = 16;

/// Hex positions of the version and variant nibbles in a simple v4 UUID.
const FIXED_NIBBLES: [usize; 2] = [12, 16];

/// A random token of exactly `length` lowercase hex characters.
///
/// Built from v4 UUIDs without their version and variant nibbles, so every
/// character carries 4 bits of entropy.
pub fn random_token(length: usize) -> String {
    let mut token = String::with_capacity(length + 32);
    while token.len() < length {
        let uuid = Uuid::new_v4().simple().to_string();
        token.extend(
            uuid.chars()
                .enumerate()
                .filter(|(i, _)| !FIXED_NIBBLES.contains(i))
                .map(|(_, c)| c),
        );
    }
    token.truncate(length);
    token
}
