//! The seam between the envelope core and the network.
//!
//! The core only needs "send these bytes with these headers to this URL,
//! give back status, headers and body". [`HttpTransport`] does that over a
//! blocking `reqwest` client; anything else implementing [`Transport`] can
//! stand in for it. Transports never retry.

use crate::envelope::{HEADER_CONTENT_TYPE, JSON_CONTENT_TYPE, OutboundRequest, RequestBody};
use crate::error::GatewayResult;
use reqwest::blocking::Client;
use reqwest::blocking::multipart::{Form, Part};
use std::sync::Arc;
use std::time::Duration;

/// Raw response handed back by a transport.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// First header named `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one envelope and returns the raw response.
pub trait Transport: Send + Sync {
    fn send(&self, request: &OutboundRequest) -> GatewayResult<TransportResponse>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(&self, request: &OutboundRequest) -> GatewayResult<TransportResponse> {
        (**self).send(request)
    }
}

/// Blocking HTTP transport backed by `reqwest`.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> GatewayResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &OutboundRequest) -> GatewayResult<TransportResponse> {
        let mut builder = self.client.post(&request.url);
        for (name, value) in request.headers.to_pairs() {
            builder = builder.header(name, value);
        }

        builder = match &request.body {
            RequestBody::Json(body) => builder
                .header(HEADER_CONTENT_TYPE, JSON_CONTENT_TYPE)
                .body(body.clone()),
            RequestBody::Multipart(form) => {
                let file = Part::bytes(form.file.clone())
                    .file_name(form.file_name.clone())
                    .mime_str("application/octet-stream")?;
                builder.multipart(Form::new().text("hash", form.hash.clone()).part("file", file))
            }
        };

        let resp = builder.send()?;
        let status = resp.status().as_u16();
        let headers = resp
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = resp.bytes()?.to_vec();

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}
