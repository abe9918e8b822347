//! Block-wise RSA PKCS#1 v1.5 encryption.
//!
//! RSA can only encrypt messages shorter than its modulus, so payloads are
//! split into chunks of `modulus_len - 11` bytes, each chunk is encrypted on
//! its own with fresh random padding, and the fixed-size ciphertext blocks
//! are concatenated and base64-encoded. Decryption walks the same layout in
//! `modulus_len` steps.
//!
//! An empty plaintext is sealed as a single block holding an encrypted empty
//! message, so it survives the round trip like any other input.

use crate::error::{CryptoError, CryptoResult};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rsa::rand_core::OsRng;
use rsa::traits::PublicKeyParts;
use rsa::{Pkcs1v15Encrypt, RsaPrivateKey, RsaPublicKey};
use tracing::debug;

/// Padding bytes PKCS#1 v1.5 encryption adds to every block.
pub const PKCS1_V15_OVERHEAD: usize = 11;

/// Largest plaintext chunk that fits in one block under `public`.
pub fn plaintext_block_size(public: &RsaPublicKey) -> usize {
    public.size().saturating_sub(PKCS1_V15_OVERHEAD)
}

/// Encrypts `plaintext` chunk by chunk and returns the base64 of the
/// concatenated ciphertext blocks.
///
/// The output differs on every call (randomized padding) but always
/// decrypts to the same plaintext.
pub fn encrypt(plaintext: &[u8], public: &RsaPublicKey) -> CryptoResult<String> {
    let block_size = plaintext_block_size(public);
    if block_size == 0 {
        return Err(CryptoError::Encryption(format!(
            "{}-byte modulus leaves no room for PKCS#1 v1.5 payload",
            public.size()
        )));
    }

    let chunks = plaintext_chunks(plaintext, block_size);
    let mut sealed = Vec::with_capacity(chunks.len() * public.size());
    let mut rng = OsRng;

    for (index, chunk) in chunks.iter().enumerate() {
        let block = public
            .encrypt(&mut rng, Pkcs1v15Encrypt, chunk)
            .map_err(|e| CryptoError::Encryption(format!("block {index}: {e}")))?;
        sealed.extend_from_slice(&block);
    }

    debug!(
        "sealed {} plaintext bytes into {} RSA block(s)",
        plaintext.len(),
        chunks.len()
    );
    Ok(STANDARD.encode(sealed))
}

/// UTF-8 convenience wrapper around [`encrypt`].
pub fn encrypt_str(plaintext: &str, public: &RsaPublicKey) -> CryptoResult<String> {
    encrypt(plaintext.as_bytes(), public)
}

/// Encrypts `plaintext` as exactly one RSA block, without chunking.
///
/// Returns the raw ciphertext block. Inputs longer than
/// [`plaintext_block_size`] are rejected rather than split.
pub fn encrypt_block(plaintext: &[u8], public: &RsaPublicKey) -> CryptoResult<Vec<u8>> {
    let block_size = plaintext_block_size(public);
    if plaintext.len() > block_size {
        return Err(CryptoError::Encryption(format!(
            "{} bytes do not fit in a single {block_size}-byte block",
            plaintext.len()
        )));
    }

    public
        .encrypt(&mut OsRng, Pkcs1v15Encrypt, plaintext)
        .map_err(|e| CryptoError::Encryption(e.to_string()))
}

/// Decodes base64 `ciphertext` and decrypts it block by block.
pub fn decrypt(ciphertext: &str, private: &RsaPrivateKey) -> CryptoResult<Vec<u8>> {
    if ciphertext.is_empty() {
        return Err(CryptoError::EmptyInput("ciphertext is empty".to_string()));
    }

    let sealed = decode_wrapped_base64(ciphertext)
        .map_err(|e| CryptoError::Encoding(format!("ciphertext is not valid base64: {e}")))?;

    let block_len = private.size();
    if sealed.is_empty() || sealed.len() % block_len != 0 {
        return Err(CryptoError::Decryption(format!(
            "ciphertext length {} is not a whole number of {block_len}-byte blocks",
            sealed.len()
        )));
    }

    let mut plaintext = Vec::with_capacity(sealed.len());
    for (index, block) in sealed.chunks(block_len).enumerate() {
        let opened = private.decrypt(Pkcs1v15Encrypt, block).map_err(|e| {
            CryptoError::Decryption(format!(
                "block {index} rejected (wrong key or tampered data): {e}"
            ))
        })?;
        plaintext.extend_from_slice(&opened);
    }

    Ok(plaintext)
}

/// [`decrypt`] followed by a UTF-8 check.
pub fn decrypt_to_string(ciphertext: &str, private: &RsaPrivateKey) -> CryptoResult<String> {
    let plaintext = decrypt(ciphertext, private)?;
    String::from_utf8(plaintext)
        .map_err(|e| CryptoError::Encoding(format!("decrypted payload is not UTF-8: {e}")))
}

/// Decodes standard base64, skipping CR and LF so MIME-wrapped text is accepted.
pub(crate) fn decode_wrapped_base64(text: &str) -> Result<Vec<u8>, base64::DecodeError> {
    if !text.contains(['\r', '\n']) {
        return STANDARD.decode(text);
    }
    let unwrapped: String = text.chars().filter(|c| !matches!(c, '\r' | '\n')).collect();
    STANDARD.decode(unwrapped)
}

/// Splits `plaintext` into `block_size` chunks; empty input is one empty chunk.
fn plaintext_chunks(plaintext: &[u8], block_size: usize) -> Vec<&[u8]> {
    if plaintext.is_empty() {
        return vec![plaintext];
    }
    plaintext.chunks(block_size).collect()
}
