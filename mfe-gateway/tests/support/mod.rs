//! Shared helpers: fixture identities, a simulated gateway, and a
//! recording in-memory transport.
#![allow(dead_code)]

use mfe_crypto::{decrypt_to_string, encrypt_str, load_private_key, load_public_key, sign, verify};
use mfe_gateway::envelope::{OutboundRequest, RequestBody};
use mfe_gateway::{
    ChannelConfig, EndpointFamily, Environment, GatewayResult, KeyPair, Transport,
    TransportResponse,
};
use std::sync::Mutex;

pub const PASSPHRASE: &str = "123456";
pub const AGENCY: &str = "AG20240001";
pub const SUCCESS: &str = "000000";

pub const CLIENT_CER: &[u8] = include_bytes!("../../../mfe-crypto/tests/fixtures/client.cer");
pub const CLIENT_PFX: &[u8] = include_bytes!("../../../mfe-crypto/tests/fixtures/client.pfx");
pub const GATEWAY_CER: &[u8] = include_bytes!("../../../mfe-crypto/tests/fixtures/gateway.cer");
pub const GATEWAY_PFX: &[u8] = include_bytes!("../../../mfe-crypto/tests/fixtures/gateway.pfx");

pub const TEST_BASE: &str = "https://test.gateway.example/mfe";
pub const PROD_BASE: &str = "https://gateway.example/mfe";
pub const FILE_TEST_BASE: &str = "https://test-files.gateway.example";
pub const FILE_PROD_BASE: &str = "https://files.gateway.example";

/// What the caller holds: the gateway's public key, its own private key.
pub fn client_keys() -> KeyPair {
    KeyPair::from_pem_and_pkcs12(GATEWAY_CER, CLIENT_PFX, PASSPHRASE).unwrap()
}

/// Channel with a strict `query` family and a lenient `file` family
/// (no business status check), mirroring the gateway's two services.
pub fn channel(environment: Environment) -> ChannelConfig {
    ChannelConfig::new(environment, AGENCY, client_keys())
        .with_family("query", EndpointFamily::new(TEST_BASE, PROD_BASE))
        .with_family(
            "file",
            EndpointFamily::new(FILE_TEST_BASE, FILE_PROD_BASE).with_business_status(false),
        )
}

/// The other side of the channel: client public key, gateway private key.
pub struct SimulatedGateway {
    keys: KeyPair,
}

impl SimulatedGateway {
    pub fn new() -> Self {
        let public = load_public_key(CLIENT_CER).unwrap();
        let private = load_private_key(GATEWAY_PFX, PASSPHRASE).unwrap();
        Self {
            keys: KeyPair::new(public, private),
        }
    }

    /// Verifies the request signature and returns the decrypted `param`.
    pub fn open_request(&self, request: &OutboundRequest) -> String {
        let RequestBody::Json(body) = &request.body else {
            panic!("expected a JSON envelope");
        };
        let body: serde_json::Value = serde_json::from_slice(body).unwrap();
        let param = body["param"].as_str().expect("param must be a string");
        self.open_param(param, &request.headers.signature)
    }

    /// Checks `signature` over the base64 `param` and decrypts it.
    pub fn open_param(&self, param: &str, signature: &str) -> String {
        verify(param.as_bytes(), signature, self.keys.public_key())
            .expect("request signature must verify");
        decrypt_to_string(param, self.keys.private_key()).unwrap()
    }

    /// Decrypts an upload's `X-Hash` after checking its signature.
    pub fn open_upload_hash(&self, request: &OutboundRequest) -> String {
        let x_hash = request.headers.hash.as_deref().expect("upload must carry X-Hash");
        verify(x_hash.as_bytes(), &request.headers.signature, self.keys.public_key())
            .expect("X-Hash signature must verify");
        decrypt_to_string(x_hash, self.keys.private_key()).unwrap()
    }

    /// A signed response whose `data` is `plaintext` sealed for the client.
    pub fn respond(&self, code: &str, message: &str, plaintext: &str) -> TransportResponse {
        let data = encrypt_str(plaintext, self.keys.public_key()).unwrap();
        let signature = sign(data.as_bytes(), self.keys.private_key()).unwrap();
        self.respond_raw(code, message, &data, Some(&signature))
    }

    /// A response with caller-chosen `data` and signature.
    pub fn respond_raw(
        &self,
        code: &str,
        message: &str,
        data: &str,
        signature: Option<&str>,
    ) -> TransportResponse {
        let body = serde_json::json!({ "code": code, "message": message, "data": data });
        let response = TransportResponse::new(200, serde_json::to_vec(&body).unwrap())
            .with_header("Content-Type", "application/json");
        match signature {
            Some(signature) => response.with_header("X-Sign", signature),
            None => response,
        }
    }

    pub fn sign(&self, data: &str) -> String {
        sign(data.as_bytes(), self.keys.private_key()).unwrap()
    }

    pub fn seal(&self, plaintext: &str) -> String {
        encrypt_str(plaintext, self.keys.public_key()).unwrap()
    }
}

type Responder = Box<dyn Fn(&OutboundRequest) -> GatewayResult<TransportResponse> + Send + Sync>;

/// In-memory transport that records every request it is asked to send.
pub struct MockTransport {
    responder: Responder,
    sent: Mutex<Vec<OutboundRequest>>,
}

impl MockTransport {
    pub fn new(
        responder: impl Fn(&OutboundRequest) -> GatewayResult<TransportResponse> + Send + Sync + 'static,
    ) -> Self {
        Self {
            responder: Box::new(responder),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<OutboundRequest> {
        self.sent.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

impl Transport for MockTransport {
    fn send(&self, request: &OutboundRequest) -> GatewayResult<TransportResponse> {
        self.sent.lock().unwrap().push(request.clone());
        (self.responder)(request)
    }
}
