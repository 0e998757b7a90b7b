//! Random password generation

use rand::{rngs::OsRng, Rng};

use crate::error::{Result, VaultError};

/// Characters drawn from when generating passwords
pub const PASSWORD_CHARSET: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!@#$%^&*()-_=+";

pub const DEFAULT_PASSWORD_LENGTH: usize = 16;
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Generate a password of `length` characters using the OS RNG
pub fn generate_password(length: usize) -> Result<String> {
    if length == 0 || length > MAX_PASSWORD_LENGTH {
        return Err(VaultError::Validation(format!(
            "Password length must be between 1 and {}",
            MAX_PASSWORD_LENGTH
        )));
    }

    let mut rng = OsRng;
    Ok((0..length)
        .map(|_| PASSWORD_CHARSET[rng.gen_range(0..PASSWORD_CHARSET.len())] as char)
        .collect())
}
