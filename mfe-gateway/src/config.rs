//! Channel configuration.
//!
//! [`GatewayConfig`] is the serializable form read from disk. Loading it
//! into a [`ChannelConfig`] parses the key material once; the result is
//! immutable and shared by every call made through a client.

use crate::error::{GatewayError, GatewayResult};
use mfe_crypto::KeyPair;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Business status code the gateway uses for success.
pub const DEFAULT_SUCCESS_CODE: &str = "000000";

/// Gateway deployment a channel talks to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Test,
    Production,
}

/// A named API family: its base URLs and response policy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointFamily {
    pub test_base_url: String,
    pub production_base_url: String,

    /// Reject non-success business codes before looking at the signature.
    #[serde(default = "default_true")]
    pub enforce_business_status: bool,

    /// Require a valid `X-Sign` over the response `data` field.
    #[serde(default = "default_true")]
    pub verify_response_signature: bool,
}

fn default_true() -> bool {
    true
}

impl EndpointFamily {
    /// Family with both response checks enabled.
    pub fn new(test_base_url: impl Into<String>, production_base_url: impl Into<String>) -> Self {
        Self {
            test_base_url: test_base_url.into(),
            production_base_url: production_base_url.into(),
            enforce_business_status: true,
            verify_response_signature: true,
        }
    }

    pub fn with_business_status(mut self, enforce: bool) -> Self {
        self.enforce_business_status = enforce;
        self
    }

    pub fn with_signature_check(mut self, verify: bool) -> Self {
        self.verify_response_signature = verify;
        self
    }

    pub fn base_url(&self, environment: Environment) -> &str {
        match environment {
            Environment::Test => &self.test_base_url,
            Environment::Production => &self.production_base_url,
        }
    }
}

/// Where the key material lives on disk.
#[derive(Clone, Serialize, Deserialize)]
pub struct KeySource {
    /// PEM X.509 certificate carrying the gateway's public key.
    pub certificate_path: PathBuf,
    /// PKCS#12 container carrying the caller's private key.
    pub pkcs12_path: PathBuf,
    #[serde(default, skip_serializing)]
    pub passphrase: String,
}

impl fmt::Debug for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeySource")
            .field("certificate_path", &self.certificate_path)
            .field("pkcs12_path", &self.pkcs12_path)
            .field("passphrase", &"<redacted>")
            .finish()
    }
}

/// On-disk gateway configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default)]
    pub environment: Environment,

    /// Agency (tenant) identifier sent with every request.
    pub agency_id: String,

    #[serde(default = "default_success_code")]
    pub success_code: String,

    /// Per-request timeout applied by the HTTP transport.
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,

    pub keys: KeySource,

    #[serde(default)]
    pub families: BTreeMap<String, EndpointFamily>,
}

fn default_success_code() -> String {
    DEFAULT_SUCCESS_CODE.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl GatewayConfig {
    pub fn from_json_str(json: &str) -> GatewayResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> GatewayResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Checks the fields that cannot be caught by deserialization alone.
    pub fn validate(&self) -> GatewayResult<()> {
        if self.agency_id.trim().is_empty() {
            return Err(GatewayError::Config("agency_id must not be empty".to_string()));
        }
        if self.success_code.is_empty() {
            return Err(GatewayError::Config("success_code must not be empty".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(GatewayError::Config(
                "request_timeout_secs must be positive".to_string(),
            ));
        }
        for (name, family) in &self.families {
            for url in [&family.test_base_url, &family.production_base_url] {
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(GatewayError::Config(format!(
                        "family '{name}' has a non-HTTP base URL: '{url}'"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Immutable runtime view of a channel: environment, identity, keys, families.
#[derive(Clone, Debug)]
pub struct ChannelConfig {
    environment: Environment,
    agency_id: String,
    success_code: String,
    key_pair: Arc<KeyPair>,
    families: BTreeMap<String, EndpointFamily>,
}

impl ChannelConfig {
    pub fn new(environment: Environment, agency_id: impl Into<String>, key_pair: KeyPair) -> Self {
        Self {
            environment,
            agency_id: agency_id.into(),
            success_code: DEFAULT_SUCCESS_CODE.to_string(),
            key_pair: Arc::new(key_pair),
            families: BTreeMap::new(),
        }
    }

    /// Validates `config` and loads its key files.
    pub fn load(config: &GatewayConfig) -> GatewayResult<Self> {
        config.validate()?;
        let keys = &config.keys;
        let key_pair = KeyPair::from_files(&keys.certificate_path, &keys.pkcs12_path, &keys.passphrase)?;

        Ok(Self {
            environment: config.environment,
            agency_id: config.agency_id.clone(),
            success_code: config.success_code.clone(),
            key_pair: Arc::new(key_pair),
            families: config.families.clone(),
        })
    }

    pub fn with_family(mut self, name: impl Into<String>, family: EndpointFamily) -> Self {
        self.families.insert(name.into(), family);
        self
    }

    pub fn with_success_code(mut self, code: impl Into<String>) -> Self {
        self.success_code = code.into();
        self
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn agency_id(&self) -> &str {
        &self.agency_id
    }

    pub fn success_code(&self) -> &str {
        &self.success_code
    }

    pub fn key_pair(&self) -> &KeyPair {
        &self.key_pair
    }

    pub fn family(&self, name: &str) -> GatewayResult<&EndpointFamily> {
        self.families
            .get(name)
            .ok_or_else(|| GatewayError::Config(format!("unknown endpoint family '{name}'")))
    }

    /// Base URL of `family` for the configured environment.
    pub fn base_url(&self, family: &str) -> GatewayResult<&str> {
        Ok(self.family(family)?.base_url(self.environment))
    }
}
