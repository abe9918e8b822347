//! Inbound response validation.
//!
//! Order matters: business status first (when enforced), then the `X-Sign`
//! signature over the raw `data` field (when required), and only then is
//! `data` decrypted. A response that fails either check is dropped whole.

use crate::config::{ChannelConfig, EndpointFamily};
use crate::envelope::HEADER_SIGN;
use crate::error::{GatewayError, GatewayResult};
use crate::transport::TransportResponse;
use mfe_crypto::{decrypt_to_string, verify};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

/// Gateway response: `data` is ciphertext on the wire, plaintext once validated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResult {
    pub code: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub message: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub data: String,
}

/// Reads a JSON `null` string field as empty.
fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl ApiResult {
    pub fn is_success(&self, success_code: &str) -> bool {
        self.code == success_code
    }

    /// Deserializes the decrypted `data` field as JSON.
    pub fn parse_data<T: DeserializeOwned>(&self) -> GatewayResult<T> {
        Ok(serde_json::from_str(&self.data)?)
    }
}

/// Checks `response` under `family`'s policy and decrypts its payload.
pub fn validate(
    response: &TransportResponse,
    family: &EndpointFamily,
    channel: &ChannelConfig,
) -> GatewayResult<ApiResult> {
    let mut result: ApiResult = match serde_json::from_slice(&response.body) {
        Ok(result) => result,
        Err(e) if !response.is_success() => {
            return Err(GatewayError::Transport(format!(
                "HTTP {} with unreadable body: {e}",
                response.status
            )));
        }
        Err(e) => return Err(e.into()),
    };

    if family.enforce_business_status && !result.is_success(channel.success_code()) {
        warn!(
            "gateway returned code {}: {}",
            result.code, result.message
        );
        return Err(GatewayError::Business {
            code: result.code,
            message: result.message,
        });
    }

    let keys = channel.key_pair();

    if family.verify_response_signature {
        let signature = response.header(HEADER_SIGN).ok_or_else(|| {
            GatewayError::Signature(format!("response carries no {HEADER_SIGN} header"))
        })?;
        verify(result.data.as_bytes(), signature, keys.public_key()).map_err(|e| {
            warn!("discarding response with code {}: {e}", result.code);
            GatewayError::from(e)
        })?;
    }

    if !result.data.is_empty() {
        result.data = decrypt_to_string(&result.data, keys.private_key())?;
    }

    Ok(result)
}
