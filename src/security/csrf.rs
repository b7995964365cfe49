use crate::error::Result;
use rand::RngCore;
use rand::rngs::OsRng;
use base64::{Engine as _, engine::general_purpose};

/// The size of the CSRF token in bytes (256 bits of randomness).
const CSRF_TOKEN_SIZE: usize = 32;

/// Generates a new random CSRF token.
///
/// # Returns
///
/// A URL-safe base64-encoded CSRF token.
pub fn generate_csrf_token() -> Result<String> {
    let mut token = [0u8; CSRF_TOKEN_SIZE];
    OsRng.fill_bytes(&mut token);

    Ok(general_purpose::URL_SAFE_NO_PAD.encode(token))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_encodes_32_bytes() {
        let token = generate_csrf_token().unwrap();
        // 32 bytes -> ceil(32 * 4 / 3) = 43 chars unpadded.
        assert_eq!(token.len(), 43);
    }

    #[test]
    fn consecutive_tokens_differ() {
        let a = generate_csrf_token().unwrap();
        let b = generate_csrf_token().unwrap();
        assert_ne!(a, b);
    }
}
