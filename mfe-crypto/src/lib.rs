//! RSA envelope primitives for the MFE gateway channel.
//!
//! Every payload sent to the gateway travels inside an envelope that is
//! both encrypted and signed:
//! - RSA PKCS#1 v1.5 encryption, applied block by block so payloads of any
//!   length fit under the modulus
//! - SHA-256 digests signed with RSA PKCS#1 v1.5
//! - Key material loaded from a PEM X.509 certificate (the gateway's public
//!   key) and a passphrase-protected PKCS#12 container (the caller's private key)
//!
//! # Key roles
//!
//! A [`KeyPair`] is not a matched pair. The public half belongs to the
//! gateway and is used to encrypt outbound payloads and verify inbound
//! signatures. The private half belongs to the caller and is used to sign
//! outbound envelopes and decrypt inbound payloads.

mod cipher;
mod error;
mod key;
mod signature;

pub use cipher::{
    decrypt, decrypt_to_string, encrypt, encrypt_block, encrypt_str, plaintext_block_size,
    PKCS1_V15_OVERHEAD,
};
pub use error::{CryptoError, CryptoResult};
pub use key::{load_private_key, load_public_key, KeyPair};
pub use rsa::{RsaPrivateKey, RsaPublicKey};
pub use signature::{is_valid_signature, sha256_hex, sign, verify};
