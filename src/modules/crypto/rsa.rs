//! RSA PKCS#1 v1.5 signing and verification for gateway notifications.
//!
//! Key material is accepted either as full PEM or as the raw Base64 body
//! Alipay hands out in its dashboard; raw bodies are wrapped before parsing.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::{Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::config::SignType;
use crate::core::{NotifyError, Result};

/// Parse an RSA public key from PEM or a raw Base64 body (PKCS#8 first,
/// PKCS#1 as fallback).
pub fn parse_public_key(material: &str) -> Result<RsaPublicKey> {
    let material = material.trim();
    if material.is_empty() {
        return Err(NotifyError::configuration("RSA public key is empty"));
    }
    RsaPublicKey::from_public_key_pem(&normalize_pem(material, "PUBLIC KEY"))
        .or_else(|_| RsaPublicKey::from_pkcs1_pem(&normalize_pem(material, "RSA PUBLIC KEY")))
        .map_err(|e| NotifyError::configuration(format!("invalid RSA public key: {e}")))
}

/// Parse an RSA private key from PEM or a raw Base64 body.
pub fn parse_private_key(material: &str) -> Result<RsaPrivateKey> {
    let material = material.trim();
    if material.is_empty() {
        return Err(NotifyError::configuration("RSA private key is empty"));
    }
    RsaPrivateKey::from_pkcs8_pem(&normalize_pem(material, "PRIVATE KEY"))
        .or_else(|_| RsaPrivateKey::from_pkcs1_pem(&normalize_pem(material, "RSA PRIVATE KEY")))
        .map_err(|e| NotifyError::configuration(format!("invalid RSA private key: {e}")))
}

/// Verify a Base64 PKCS#1 v1.5 signature over `message`.
///
/// Pure check: malformed Base64 or a failed verification both yield `false`,
/// the caller decides how to fail the notification.
pub fn verify(
    public_key: &RsaPublicKey,
    sign_type: SignType,
    message: &[u8],
    signature_b64: &str,
) -> bool {
    let Ok(signature) = BASE64.decode(signature_b64.trim()) else {
        return false;
    };
    match sign_type {
        SignType::Rsa2 => public_key
            .verify(
                Pkcs1v15Sign::new::<Sha256>(),
                &Sha256::digest(message),
                &signature,
            )
            .is_ok(),
        SignType::Rsa => public_key
            .verify(
                Pkcs1v15Sign::new::<Sha1>(),
                &Sha1::digest(message),
                &signature,
            )
            .is_ok(),
    }
}

/// Produce a Base64 PKCS#1 v1.5 signature over `message`.
pub fn sign(private_key: &RsaPrivateKey, sign_type: SignType, message: &[u8]) -> Result<String> {
    let signature = match sign_type {
        SignType::Rsa2 => private_key.sign(Pkcs1v15Sign::new::<Sha256>(), &Sha256::digest(message)),
        SignType::Rsa => private_key.sign(Pkcs1v15Sign::new::<Sha1>(), &Sha1::digest(message)),
    }
    .map_err(|e| NotifyError::configuration(format!("RSA signing failed: {e}")))?;
    Ok(BASE64.encode(signature))
}

/// Wrap a bare Base64 key body into a PEM block; pass PEM input through.
fn normalize_pem(material: &str, label: &str) -> String {
    if material.contains("-----BEGIN") {
        return material.to_string();
    }
    let body: String = material.split_whitespace().collect();
    let mut pem = format!("-----BEGIN {label}-----\n");
    for chunk in body.as_bytes().chunks(64) {
        pem.push_str(std::str::from_utf8(chunk).unwrap_or_default());
        pem.push('\n');
    }
    pem.push_str(&format!("-----END {label}-----\n"));
    pem
}
