// Identity contexts for bac-hunter
// One authenticated actor: either a raw cookie string or an Authorization token

use base64::{engine::general_purpose, Engine as _};
use serde_json::Value;

pub const USER_AGENT: &str = "IDOR-BAC-Hunter/1.0";

/// Credential material carried by an identity. Exactly one kind per identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    /// Raw `k=v; k=v` cookie string
    Cookie(String),
    /// Authorization header value, sent as-is
    BearerToken(String),
}

/// Immutable credential material plus a stable identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityContext {
    identity_id: String,
    credential: Credential,
}

impl IdentityContext {
    pub fn new(identity_id: impl Into<String>, credential: Credential) -> Self {
        Self {
            identity_id: identity_id.into(),
            credential,
        }
    }

    pub fn with_cookie(identity_id: impl Into<String>, cookie: impl Into<String>) -> Self {
        Self::new(identity_id, Credential::Cookie(cookie.into()))
    }

    pub fn with_token(identity_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self::new(identity_id, Credential::BearerToken(token.into()))
    }

    pub fn identity_id(&self) -> &str {
        &self.identity_id
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn cookie(&self) -> Option<&str> {
        match &self.credential {
            Credential::Cookie(c) => Some(c),
            Credential::BearerToken(_) => None,
        }
    }

    pub fn bearer_token(&self) -> Option<&str> {
        match &self.credential {
            Credential::BearerToken(t) => Some(t),
            Credential::Cookie(_) => None,
        }
    }

    /// Request headers for this identity. Token identities add `Authorization`.
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        let mut headers = vec![
            ("User-Agent", USER_AGENT.to_string()),
            ("Accept", "*/*".to_string()),
        ];
        if let Credential::BearerToken(token) = &self.credential {
            headers.push(("Authorization", token.clone()));
        }
        headers
    }

    /// Cookie pairs parsed from the raw cookie string, in their original order.
    /// Pieces without `=` are dropped.
    pub fn cookies(&self) -> Option<Vec<(String, String)>> {
        let raw = self.cookie()?;
        let pairs = raw
            .split(';')
            .filter_map(|piece| {
                let (key, value) = piece.trim().split_once('=')?;
                Some((key.to_string(), value.to_string()))
            })
            .collect();
        Some(pairs)
    }

    /// `Cookie` header value rebuilt from the parsed pairs.
    pub fn cookie_header(&self) -> Option<String> {
        let pairs = self.cookies()?;
        if pairs.is_empty() {
            return None;
        }
        Some(
            pairs
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    /// User id claimed by a JWT token, if the token is one. Only used for display.
    pub fn token_subject(&self) -> Option<String> {
        extract_user_id_from_jwt(self.bearer_token()?)
    }
}

/// Extract user ID from JWT token by decoding the payload
fn extract_user_id_from_jwt(token: &str) -> Option<String> {
    let token = token
        .strip_prefix("Bearer ")
        .or_else(|| token.strip_prefix("bearer "))
        .unwrap_or(token)
        .trim();

    // JWT format: header.payload.signature
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return None;
    }

    // JWT uses base64url encoding without padding
    let decoded = general_purpose::URL_SAFE_NO_PAD.decode(parts[1]).ok()?;
    let payload_str = String::from_utf8(decoded).ok()?;
    let json: Value = serde_json::from_str(&payload_str).ok()?;

    // Try common JWT claim names for user ID
    ["userId", "user_id", "sub", "id"]
        .iter()
        .filter_map(|claim| json.get(*claim))
        .find_map(|v| v.as_str().map(str::to_string))
}

/// Attaches credential material to an outgoing request.
pub trait AuthStrategy {
    fn apply_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder;
}

impl AuthStrategy for IdentityContext {
    fn apply_auth(&self, mut req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        for (name, value) in self.headers() {
            req = req.header(name, value);
        }
        if let Some(cookie) = self.cookie_header() {
            req = req.header(reqwest::header::COOKIE, cookie);
        }
        req
    }
}
