//! Key material loading.
//!
//! The gateway's public key arrives as a PEM-encoded X.509 certificate; the
//! caller's private key arrives inside a passphrase-protected PKCS#12
//! container. Both are parsed once and held immutably for the lifetime of a
//! channel.

use crate::cipher;
use crate::error::{CryptoError, CryptoResult};
use p12_keystore::KeyStore;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use std::fmt;
use std::path::Path;
use tracing::debug;
use x509_cert::Certificate;
use x509_cert::der::{DecodePem, Encode};

/// Gateway public key plus caller private key.
///
/// The two halves are independent identities and are never checked against
/// each other.
#[derive(Clone)]
pub struct KeyPair {
    public: RsaPublicKey,
    private: RsaPrivateKey,
}

impl KeyPair {
    pub fn new(public: RsaPublicKey, private: RsaPrivateKey) -> Self {
        Self { public, private }
    }

    /// Parses a PEM certificate and a PKCS#12 container held in memory.
    pub fn from_pem_and_pkcs12(
        certificate: &[u8],
        pkcs12: &[u8],
        passphrase: &str,
    ) -> CryptoResult<Self> {
        let public = load_public_key(certificate)?;
        let private = load_private_key(pkcs12, passphrase)?;
        Ok(Self::new(public, private))
    }

    /// Reads and parses the certificate and PKCS#12 files.
    pub fn from_files(
        certificate_path: impl AsRef<Path>,
        pkcs12_path: impl AsRef<Path>,
        passphrase: &str,
    ) -> CryptoResult<Self> {
        let certificate_path = certificate_path.as_ref();
        let pkcs12_path = pkcs12_path.as_ref();
        debug!(
            "loading key material from {} and {}",
            certificate_path.display(),
            pkcs12_path.display()
        );

        let certificate = std::fs::read(certificate_path)?;
        let pkcs12 = std::fs::read(pkcs12_path)?;
        Self::from_pem_and_pkcs12(&certificate, &pkcs12, passphrase)
    }

    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public
    }

    pub fn private_key(&self) -> &RsaPrivateKey {
        &self.private
    }

    /// Largest plaintext chunk one outbound RSA block can carry.
    pub fn plaintext_block_size(&self) -> usize {
        cipher::plaintext_block_size(&self.public)
    }

    /// Size of one inbound ciphertext block (the private modulus length).
    pub fn ciphertext_block_size(&self) -> usize {
        self.private.size()
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_modulus_bits", &(self.public.size() * 8))
            .field("private", &"<redacted>")
            .finish()
    }
}

/// Extracts the RSA public key embedded in a PEM-encoded X.509 certificate.
pub fn load_public_key(certificate: &[u8]) -> CryptoResult<RsaPublicKey> {
    let cert = Certificate::from_pem(certificate).map_err(|e| {
        CryptoError::KeyFormat(format!("certificate is not a valid PEM X.509 document: {e}"))
    })?;

    let spki = cert
        .tbs_certificate
        .subject_public_key_info
        .to_der()
        .map_err(|e| CryptoError::KeyFormat(format!("cannot re-encode public key info: {e}")))?;

    RsaPublicKey::from_public_key_der(&spki).map_err(|e| {
        CryptoError::KeyFormat(format!("certificate does not carry an RSA public key: {e}"))
    })
}

/// Opens a PKCS#12 container with `passphrase` and extracts its RSA private key.
///
/// The first private key entry is used. Key bags are normally PKCS#8; a bare
/// PKCS#1 `RSAPrivateKey` is accepted as well.
pub fn load_private_key(pkcs12: &[u8], passphrase: &str) -> CryptoResult<RsaPrivateKey> {
    let store = KeyStore::from_pkcs12(pkcs12, passphrase).map_err(|e| {
        CryptoError::KeyFormat(format!(
            "cannot open PKCS#12 container (wrong passphrase or malformed data): {e}"
        ))
    })?;

    let (alias, chain) = store.private_key_chain().ok_or_else(|| {
        CryptoError::KeyFormat("PKCS#12 container holds no private key".to_string())
    })?;
    debug!("using private key entry '{alias}' from PKCS#12 container");

    parse_rsa_private_key(chain.key())
}

fn parse_rsa_private_key(der: &[u8]) -> CryptoResult<RsaPrivateKey> {
    RsaPrivateKey::from_pkcs8_der(der)
        .or_else(|_| RsaPrivateKey::from_pkcs1_der(der))
        .map_err(|e| {
            CryptoError::KeyFormat(format!(
                "private key is not an RSA key in PKCS#8 or PKCS#1 form: {e}"
            ))
        })
}
