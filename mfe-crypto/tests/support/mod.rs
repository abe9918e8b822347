//! Shared fixtures: two RSA-2048 identities and one EC identity.
//!
//! `client.pfx` uses PBES2/AES-256 (OpenSSL 3 default), `gateway.pfx` uses
//! the legacy SHA1/3DES scheme. All containers share one passphrase.
#![allow(dead_code)]

use mfe_crypto::{load_private_key, load_public_key, KeyPair, RsaPrivateKey, RsaPublicKey};
use std::sync::OnceLock;

pub const PASSPHRASE: &str = "123456";

pub const CLIENT_CER: &[u8] = include_bytes!("../fixtures/client.cer");
pub const CLIENT_PFX: &[u8] = include_bytes!("../fixtures/client.pfx");
pub const GATEWAY_CER: &[u8] = include_bytes!("../fixtures/gateway.cer");
pub const GATEWAY_PFX: &[u8] = include_bytes!("../fixtures/gateway.pfx");
pub const EC_CER: &[u8] = include_bytes!("../fixtures/ec.cer");
pub const EC_PFX: &[u8] = include_bytes!("../fixtures/ec.pfx");

struct Identity {
    public: RsaPublicKey,
    private: RsaPrivateKey,
}

fn client() -> &'static Identity {
    static CLIENT: OnceLock<Identity> = OnceLock::new();
    CLIENT.get_or_init(|| Identity {
        public: load_public_key(CLIENT_CER).expect("client certificate must load"),
        private: load_private_key(CLIENT_PFX, PASSPHRASE).expect("client PKCS#12 must load"),
    })
}

fn gateway() -> &'static Identity {
    static GATEWAY: OnceLock<Identity> = OnceLock::new();
    GATEWAY.get_or_init(|| Identity {
        public: load_public_key(GATEWAY_CER).expect("gateway certificate must load"),
        private: load_private_key(GATEWAY_PFX, PASSPHRASE).expect("gateway PKCS#12 must load"),
    })
}

/// Public and private halves of the same identity.
pub fn matched_pair() -> KeyPair {
    let c = client();
    KeyPair::new(c.public.clone(), c.private.clone())
}

/// A second, unrelated identity.
pub fn other_pair() -> KeyPair {
    let g = gateway();
    KeyPair::new(g.public.clone(), g.private.clone())
}
