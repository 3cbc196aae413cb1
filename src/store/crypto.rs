//! AES-256-GCM sealing of the persisted ledger document.
//!
//! Stored value layout: base64(12-byte random IV || ciphertext). The raw
//! 256-bit key lives in its own file next to the data, base64-encoded.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::{generic_array::GenericArray, Aead, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use thiserror::Error;

pub(crate) const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("key must be exactly {KEY_LEN} bytes")]
    InvalidKey,
    #[error("stored value is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),
    #[error("stored value is too short to contain an IV")]
    Malformed,
    #[error("encryption failed")]
    Encrypt,
    #[error("decryption failed: wrong key or corrupted data")]
    Decrypt,
    #[error("decrypted data is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

pub(crate) fn generate_key() -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    OsRng.fill_bytes(&mut key);
    key
}

pub(crate) fn encode_key(key: &[u8; KEY_LEN]) -> String {
    BASE64.encode(key)
}

pub(crate) fn decode_key(encoded: &str) -> Result<[u8; KEY_LEN], CryptoError> {
    let bytes = BASE64.decode(encoded.trim())?;
    bytes.try_into().map_err(|_| CryptoError::InvalidKey)
}

pub(crate) fn encrypt(plaintext: &str, key: &[u8; KEY_LEN]) -> Result<String, CryptoError> {
    let cipher = Aes256Gcm::new(GenericArray::from_slice(key));
    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext.as_bytes())
        .map_err(|_| CryptoError::Encrypt)?;

    let mut combined = nonce_bytes.to_vec();
    combined.extend(ciphertext);
    Ok(BASE64.encode(combined))
}

pub(crate) fn decrypt(stored: &str, key: &[u8; KEY_LEN]) -> Result<String, CryptoError> {
    let combined = BASE64.decode(stored.trim())?;
    if combined.len() < NONCE_LEN {
        return Err(CryptoError::Malformed);
    }

    let (nonce_bytes, ciphertext) = combined.split_at(NONCE_LEN);
    let cipher = Aes256Gcm::new(GenericArray::from_slice(key));
    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
        .map_err(|_| CryptoError::Decrypt)?;

    Ok(String::from_utf8(plaintext)?)
}
