//! SHA-256 + RSA PKCS#1 v1.5 signatures, and the hex digest used for uploads.

use crate::cipher::decode_wrapped_base64;
use crate::error::{CryptoError, CryptoResult};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rsa::{Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256};

/// Signs the SHA-256 digest of `message` and returns the base64 signature.
pub fn sign(message: &[u8], private: &RsaPrivateKey) -> CryptoResult<String> {
    let digest = Sha256::digest(message);
    let signature = private
        .sign(Pkcs1v15Sign::new::<Sha256>(), &digest)
        .map_err(|e| CryptoError::Encryption(format!("signing failed: {e}")))?;
    Ok(STANDARD.encode(signature))
}

/// Checks a base64 signature over `message`.
///
/// Any decode failure or mismatch is reported as
/// [`CryptoError::InvalidSignature`] with the cause.
pub fn verify(message: &[u8], signature: &str, public: &RsaPublicKey) -> CryptoResult<()> {
    let signature = decode_wrapped_base64(signature).map_err(|e| {
        CryptoError::InvalidSignature(format!("signature is not valid base64: {e}"))
    })?;

    let digest = Sha256::digest(message);
    public
        .verify(Pkcs1v15Sign::new::<Sha256>(), &digest, &signature)
        .map_err(|e| CryptoError::InvalidSignature(format!("verification failed: {e}")))
}

/// Boolean form of [`verify`].
pub fn is_valid_signature(message: &[u8], signature: &str, public: &RsaPublicKey) -> bool {
    verify(message, signature, public).is_ok()
}

/// Lowercase hex SHA-256 of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}
