// HTTP transport for bac-hunter
// Uses reqwest and tokio; every request resolves to an Outcome, never an error

use crate::error::TransportError;
use crate::identity::{AuthStrategy, IdentityContext, USER_AGENT};
use crate::models::{Method, Outcome};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Performs one request on behalf of an identity (or anonymously).
///
/// Implementations must report ordinary network failures as
/// [`Outcome::Failed`]; the scan relies on this to never abort.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn request(
        &self,
        url: &str,
        method: Method,
        identity: Option<&IdentityContext>,
        body: Option<&Value>,
    ) -> Outcome;
}

pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, TransportError> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Targets are usually staging hosts with self-signed certificates, so
    /// certificate validation is off. Redirects are followed.
    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .danger_accept_invalid_certs(true)
            .pool_max_idle_per_host(10)
            .build()?;
        Ok(Self { client })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(
        &self,
        url: &str,
        method: Method,
        identity: Option<&IdentityContext>,
        body: Option<&Value>,
    ) -> Outcome {
        let mut req = self.client.request(method.as_reqwest(), url);
        if let Some(identity) = identity {
            req = identity.apply_auth(req);
        }
        if let Some(body) = body.filter(|_| method.carries_body()) {
            req = req.json(body);
        }

        let resp = match req.send().await {
            Ok(resp) => resp,
            Err(e) => {
                debug!(%url, %method, error = %e, "request failed");
                return Outcome::failed(e.to_string());
            }
        };

        let status = resp.status().as_u16();
        match resp.bytes().await {
            Ok(bytes) => Outcome::response(status, bytes.len() as u64),
            Err(e) => {
                debug!(%url, %method, status, error = %e, "failed to read response body");
                Outcome::failed(e.to_string())
            }
        }
    }
}
