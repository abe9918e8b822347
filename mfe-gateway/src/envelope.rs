//! Outbound envelope construction.
//!
//! A standard call encrypts the payload block-wise with the gateway's
//! public key, signs the resulting base64 ciphertext with the caller's
//! private key, and wraps it as `{"param": "<ciphertext>"}`. A file upload
//! instead encrypts the file's SHA-256 hex digest as one block (`X-Hash`)
//! and signs that string; the file itself travels in the clear inside a
//! multipart form.

use crate::config::ChannelConfig;
use crate::error::GatewayResult;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use mfe_crypto::{encrypt, encrypt_block, sha256_hex, sign};
use serde::Serialize;
use std::path::Path;
use std::sync::atomic::{AtomicI64, Ordering};
use tracing::debug;

pub const HEADER_CONTENT_TYPE: &str = "Content-Type";
pub const HEADER_SECURITY: &str = "X-Security";
pub const HEADER_AGENCY: &str = "X-Agency";
pub const HEADER_SIGN: &str = "X-Sign";
pub const HEADER_TIME: &str = "X-Time";
pub const HEADER_TRACE: &str = "X-Trace";
pub const HEADER_HASH: &str = "X-Hash";

/// Fixed value of the `X-Security` header.
pub const SECURITY_TAG: &str = "CFCA";

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Upload endpoint path used by the gateway's file service.
pub const DEFAULT_UPLOAD_PATH: &str = "/file/api/upload";

/// RFC 1123 date in UTC, e.g. `Mon, 02 Jan 2006 15:04:05 GMT`.
const RFC1123_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

static LAST_TRACE: AtomicI64 = AtomicI64::new(0);

/// Headers bound to one envelope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnvelopeHeaders {
    pub security: String,
    pub agency: String,
    pub signature: String,
    pub timestamp: String,
    pub trace: String,
    /// Encrypted file digest, uploads only.
    pub hash: Option<String>,
}

impl EnvelopeHeaders {
    fn stamp(agency: &str, signature: String, hash: Option<String>) -> Self {
        Self {
            security: SECURITY_TAG.to_string(),
            agency: agency.to_string(),
            signature,
            timestamp: Utc::now().format(RFC1123_FORMAT).to_string(),
            trace: next_trace_id(),
            hash,
        }
    }

    /// Wire header names and values, excluding `Content-Type`.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            (HEADER_SECURITY, self.security.clone()),
            (HEADER_AGENCY, self.agency.clone()),
            (HEADER_SIGN, self.signature.clone()),
            (HEADER_TIME, self.timestamp.clone()),
            (HEADER_TRACE, self.trace.clone()),
        ];
        if let Some(hash) = &self.hash {
            pairs.push((HEADER_HASH, hash.clone()));
        }
        pairs
    }
}

/// Multipart form carried by an upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadForm {
    /// Plain hex SHA-256 of `file`, sent as the `hash` field.
    pub hash: String,
    pub file_name: String,
    pub file: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RequestBody {
    /// Serialized `{"param": ...}` object.
    Json(Vec<u8>),
    Multipart(UploadForm),
}

/// Everything a transport needs to send one call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboundRequest {
    pub url: String,
    pub headers: EnvelopeHeaders,
    pub body: RequestBody,
}

#[derive(Serialize)]
struct ParamBody<'a> {
    param: &'a str,
}

/// Builds a standard encrypted and signed call to `endpoint_path` of `family`.
pub fn build_request(
    family: &str,
    endpoint_path: &str,
    plaintext: &[u8],
    channel: &ChannelConfig,
) -> GatewayResult<OutboundRequest> {
    let url = endpoint_url(channel.base_url(family)?, endpoint_path);
    let keys = channel.key_pair();

    let ciphertext = encrypt(plaintext, keys.public_key())?;
    let signature = sign(ciphertext.as_bytes(), keys.private_key())?;
    let body = serde_json::to_vec(&ParamBody { param: &ciphertext })?;

    let headers = EnvelopeHeaders::stamp(channel.agency_id(), signature, None);
    debug!("built envelope for {url} (trace {})", headers.trace);

    Ok(OutboundRequest {
        url,
        headers,
        body: RequestBody::Json(body),
    })
}

/// Reads `file_path` and builds an upload call for it.
pub fn build_file_upload_request(
    family: &str,
    endpoint_path: &str,
    file_path: &Path,
    channel: &ChannelConfig,
) -> GatewayResult<OutboundRequest> {
    let file = std::fs::read(file_path)?;
    let file_name = file_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());

    build_upload_request(family, endpoint_path, file_name, file, channel)
}

/// Builds an upload call for in-memory file content.
pub fn build_upload_request(
    family: &str,
    endpoint_path: &str,
    file_name: impl Into<String>,
    file: Vec<u8>,
    channel: &ChannelConfig,
) -> GatewayResult<OutboundRequest> {
    let url = endpoint_url(channel.base_url(family)?, endpoint_path);
    let keys = channel.key_pair();

    let hash = sha256_hex(&file);
    let x_hash = STANDARD.encode(encrypt_block(hash.as_bytes(), keys.public_key())?);
    let signature = sign(x_hash.as_bytes(), keys.private_key())?;

    let headers = EnvelopeHeaders::stamp(channel.agency_id(), signature, Some(x_hash));
    debug!(
        "built upload envelope for {url} ({} bytes, trace {})",
        file.len(),
        headers.trace
    );

    Ok(OutboundRequest {
        url,
        headers,
        body: RequestBody::Multipart(UploadForm {
            hash,
            file_name: file_name.into(),
            file,
        }),
    })
}

fn endpoint_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Nanosecond wall-clock trace id, bumped when two calls share a tick.
fn next_trace_id() -> String {
    let now = Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX);
    let previous = match LAST_TRACE.fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
        Some(now.max(last.saturating_add(1)))
    }) {
        Ok(previous) | Err(previous) => previous,
    };
    now.max(previous.saturating_add(1)).to_string()
}
