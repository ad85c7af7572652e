//! Secret generation from the OS cryptographic RNG.

use crate::error::{Result, TemplateError};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;

const ACCESS_KEY_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// URL-safe random secret of exactly `length` characters.
pub fn generate_secret(length: usize) -> Result<String> {
    let mut bytes = vec![0u8; length];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| TemplateError::Rng(e.to_string()))?;
    // Base64 of n bytes is always longer than n characters.
    let encoded = URL_SAFE_NO_PAD.encode(&bytes);
    Ok(encoded[..length].to_string())
}

/// Uppercase-alphanumeric key (object-store access keys), rejection-sampled
/// so every character is uniform over the 36-letter alphabet.
pub fn generate_access_key(length: usize) -> Result<String> {
    let mut out = String::with_capacity(length);
    let limit = 252u8; // largest multiple of 36 that fits in a byte

    while out.len() < length {
        let mut buf = [0u8; 32];
        OsRng
            .try_fill_bytes(&mut buf)
            .map_err(|e| TemplateError::Rng(e.to_string()))?;
        for byte in buf {
            if byte < limit {
                out.push(ACCESS_KEY_ALPHABET[(byte % 36) as usize] as char);
                if out.len() == length {
                    break;
                }
            }
        }
    }
    Ok(out)
}

/// Retry a generator up to three times before giving up on the RNG.
pub fn generate_with_retry<F>(mut generate: F) -> Result<String>
where
    F: FnMut() -> Result<String>,
{
    let mut last_error = TemplateError::Rng("random generator unavailable".to_string());
    for _ in 0..3 {
        match generate() {
            Ok(secret) => return Ok(secret),
            Err(e) => last_error = e,
        }
    }
    Err(last_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_has_requested_length() {
        for length in [16, 24, 32, 48] {
            let secret = generate_secret(length).unwrap();
            assert_eq!(secret.len(), length);
            assert!(secret
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        }
    }

    #[test]
    fn test_secrets_are_independent_draws() {
        let a = generate_secret(32).unwrap();
        let b = generate_secret(32).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_access_key_alphabet() {
        let key = generate_access_key(16).unwrap();
        assert_eq!(key.len(), 16);
        assert!(key
            .bytes()
            .all(|b| ACCESS_KEY_ALPHABET.contains(&b)));
    }

    #[test]
    fn test_retry_surfaces_last_error_after_three_attempts() {
        let mut calls = 0;
        let result = generate_with_retry(|| {
            calls += 1;
            Err(TemplateError::Rng("entropy pool on fire".to_string()))
        });
        assert_eq!(calls, 3);
        assert!(result.is_err());
    }

    #[test]
    fn test_retry_stops_on_success() {
        let mut calls = 0;
        let result = generate_with_retry(|| {
            calls += 1;
            if calls < 2 {
                Err(TemplateError::Rng("transient".to_string()))
            } else {
                generate_secret(24)
            }
        });
        assert_eq!(calls, 2);
        assert_eq!(result.unwrap().len(), 24);
    }
}
