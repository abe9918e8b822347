//! Gateway client: one parameterized call path for every endpoint family.

use crate::config::{ChannelConfig, EndpointFamily, GatewayConfig};
use crate::envelope::{build_file_upload_request, build_request, OutboundRequest};
use crate::error::{GatewayError, GatewayResult};
use crate::transport::{HttpTransport, Transport};
use crate::validator::{validate, ApiResult};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

/// Signed, encrypted channel to the gateway.
///
/// Holds no mutable state; share it freely across threads.
pub struct GatewayClient<T: Transport = HttpTransport> {
    channel: ChannelConfig,
    transport: T,
}

impl GatewayClient<HttpTransport> {
    /// Loads key material and builds an HTTP-backed client.
    ///
    /// Fails with a typed error if the certificate, PKCS#12 container or
    /// passphrase is unusable; no partially initialized client is returned.
    pub fn from_config(config: &GatewayConfig) -> GatewayResult<Self> {
        let channel = ChannelConfig::load(config)?;
        let transport = HttpTransport::new(Duration::from_secs(config.request_timeout_secs))?;
        Ok(Self::with_transport(channel, transport))
    }
}

impl<T: Transport> GatewayClient<T> {
    pub fn with_transport(channel: ChannelConfig, transport: T) -> Self {
        Self { channel, transport }
    }

    pub fn channel(&self) -> &ChannelConfig {
        &self.channel
    }

    /// Encrypts and signs `payload`, posts it, and returns the validated,
    /// decrypted result.
    pub fn post(&self, family: &str, path: &str, payload: &str) -> GatewayResult<ApiResult> {
        let policy = self.channel.family(family)?;
        let request = build_request(family, path, payload.as_bytes(), &self.channel)?;
        self.dispatch(policy, &request)
    }

    /// Serializes `payload` as JSON, then behaves like [`post`](Self::post).
    pub fn post_json<S: Serialize + ?Sized>(
        &self,
        family: &str,
        path: &str,
        payload: &S,
    ) -> GatewayResult<ApiResult> {
        let json = serde_json::to_string(payload)?;
        self.post(family, path, &json)
    }

    /// Uploads the file at `file_path` with its encrypted digest in `X-Hash`.
    pub fn upload_file(
        &self,
        family: &str,
        path: &str,
        file_path: impl AsRef<Path>,
    ) -> GatewayResult<ApiResult> {
        let policy = self.channel.family(family)?;
        let request = build_file_upload_request(family, path, file_path.as_ref(), &self.channel)?;
        self.dispatch(policy, &request)
    }

    fn dispatch(
        &self,
        policy: &EndpointFamily,
        request: &OutboundRequest,
    ) -> GatewayResult<ApiResult> {
        debug!("POST {} (trace {})", request.url, request.headers.trace);

        let response = self.transport.send(request).map_err(|e| {
            warn!("request to {} failed: {e}", request.url);
            match e {
                GatewayError::Transport(_) => e,
                other => GatewayError::Transport(other.to_string()),
            }
        })?;
        debug!(
            "received HTTP {} ({} bytes) for trace {}",
            response.status,
            response.body.len(),
            request.headers.trace
        );

        validate(&response, policy, &self.channel)
    }
}
