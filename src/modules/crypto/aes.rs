//! AES-256-GCM for the WeChat Pay APIv3 encrypted notification resource.

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use crate::core::{NotifyError, Result};

/// AES-256-GCM key length in bytes (the APIv3 key)
pub const KEY_LEN: usize = 32;

/// GCM nonce length in bytes
pub const NONCE_LEN: usize = 12;

/// Decrypt a Base64 `ciphertext || tag` blob.
///
/// Any failure is fatal to the current notification; there is no partial
/// decryption.
pub fn decrypt(
    key: &[u8],
    nonce: &[u8],
    associated_data: &[u8],
    ciphertext_b64: &str,
) -> Result<Vec<u8>> {
    let cipher = new_cipher(key)?;
    if nonce.len() != NONCE_LEN {
        return Err(NotifyError::decryption(format!(
            "nonce must be {NONCE_LEN} bytes, got {}",
            nonce.len()
        )));
    }
    let ciphertext = BASE64
        .decode(ciphertext_b64)
        .map_err(|e| NotifyError::decryption(format!("ciphertext is not valid Base64: {e}")))?;
    cipher
        .decrypt(
            Nonce::from_slice(nonce),
            Payload {
                msg: &ciphertext,
                aad: associated_data,
            },
        )
        .map_err(|_| NotifyError::decryption("authentication tag mismatch"))
}

/// Encrypt plaintext to a Base64 `ciphertext || tag` blob, the inverse of
/// [`decrypt`].
pub fn encrypt(
    key: &[u8],
    nonce: &[u8],
    associated_data: &[u8],
    plaintext: &[u8],
) -> Result<String> {
    let cipher = new_cipher(key)?;
    if nonce.len() != NONCE_LEN {
        return Err(NotifyError::decryption(format!(
            "nonce must be {NONCE_LEN} bytes, got {}",
            nonce.len()
        )));
    }
    let ciphertext = cipher
        .encrypt(
            Nonce::from_slice(nonce),
            Payload {
                msg: plaintext,
                aad: associated_data,
            },
        )
        .map_err(|_| NotifyError::decryption("encryption failed"))?;
    Ok(BASE64.encode(ciphertext))
}

fn new_cipher(key: &[u8]) -> Result<Aes256Gcm> {
    if key.len() != KEY_LEN {
        return Err(NotifyError::decryption(format!(
            "key must be {KEY_LEN} bytes, got {}",
            key.len()
        )));
    }
    Aes256Gcm::new_from_slice(key).map_err(|_| NotifyError::decryption("invalid AES key"))
}
