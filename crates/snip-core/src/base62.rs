//! Positional base62 codec for counter values.
//!
//! Tokens are the big-endian base62 digits of the counter value, most
//! significant digit first, with no padding. Distinct inputs always produce
//! distinct tokens.

use crate::error::{CoreError, Result};

const ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
const BASE: u64 = ALPHABET.len() as u64;

/// Longest token `encode` can produce (`u64::MAX` needs 11 digits).
pub const MAX_LEN: usize = 11;

/// Encodes `n` as a base62 token.
pub fn encode(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::with_capacity(MAX_LEN);
    while n > 0 {
        digits.push(ALPHABET[(n % BASE) as usize]);
        n /= BASE;
    }
    digits.reverse();

    // every byte comes from ALPHABET
    digits.into_iter().map(char::from).collect()
}

/// Decodes a token produced by [`encode`].
///
/// Fails on an empty token, on characters outside the alphabet and on
/// values that do not fit in a `u64`.
pub fn decode(token: &str) -> Result<u64> {
    if token.is_empty() {
        return Err(CoreError::MalformedToken("token is empty".to_string()));
    }

    token.bytes().try_fold(0_u64, |acc, byte| {
        let digit = digit_value(byte).ok_or_else(|| {
            CoreError::MalformedToken(format!(
                "unexpected character {:?} in '{}'",
                char::from(byte),
                token
            ))
        })?;
        acc.checked_mul(BASE)
            .and_then(|acc| acc.checked_add(digit))
            .ok_or_else(|| CoreError::MalformedToken(format!("'{}' overflows a u64", token)))
    })
}

fn digit_value(byte: u8) -> Option<u64> {
    let value = match byte {
        b'0'..=b'9' => byte - b'0',
        b'A'..=b'Z' => byte - b'A' + 10,
        b'a'..=b'z' => byte - b'a' + 36,
        _ => return None,
    };
    Some(u64::from(value))
}
