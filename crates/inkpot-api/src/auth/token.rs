//! Opaque invitation tokens
//!
//! Invitation links carry a random token that is stored verbatim and matched
//! exactly. 32 random bytes, hex-encoded, fits the 64-char column.

use rand::Rng;

const TOKEN_BYTES: usize = 32;

pub fn generate_invitation_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; TOKEN_BYTES] = rng.random();
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_is_64_hex_chars() {
        let token = generate_invitation_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_tokens_are_unique() {
        assert_ne!(generate_invitation_token(), generate_invitation_token());
    }
}
