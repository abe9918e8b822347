//! Client channel to the MFE financial gateway.
//!
//! Every call is wrapped in a confidentiality-plus-authenticity envelope:
//! - outbound payloads are RSA-encrypted for the gateway and signed by the caller
//! - inbound payloads are signature-checked and decrypted before use
//! - business status and signature policies are configured per endpoint family
//!
//! Networking sits behind the [`Transport`] trait; [`HttpTransport`] is the
//! default blocking implementation.

pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod transport;
pub mod validator;

pub use client::GatewayClient;
pub use config::{ChannelConfig, EndpointFamily, Environment, GatewayConfig, KeySource};
pub use error::{GatewayError, GatewayResult};
pub use mfe_crypto::KeyPair;
pub use transport::{HttpTransport, Transport, TransportResponse};
pub use validator::ApiResult;
