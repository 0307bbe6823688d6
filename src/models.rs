// Core data models for bac-hunter
// Request outcomes, the per-endpoint outcome table, equivalence keys and findings

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported HTTP methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
    GET,
    POST,
    PUT,
    DELETE,
    PATCH,
    OPTIONS,
    HEAD,
}

impl Method {
    /// Methods whose requests carry a JSON body when one is supplied.
    pub fn carries_body(&self) -> bool {
        matches!(self, Method::POST | Method::PUT | Method::PATCH)
    }

    pub fn as_reqwest(&self) -> reqwest::Method {
        match self {
            Method::GET => reqwest::Method::GET,
            Method::POST => reqwest::Method::POST,
            Method::PUT => reqwest::Method::PUT,
            Method::DELETE => reqwest::Method::DELETE,
            Method::PATCH => reqwest::Method::PATCH,
            Method::OPTIONS => reqwest::Method::OPTIONS,
            Method::HEAD => reqwest::Method::HEAD,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::GET => write!(f, "GET"),
            Method::POST => write!(f, "POST"),
            Method::PUT => write!(f, "PUT"),
            Method::DELETE => write!(f, "DELETE"),
            Method::PATCH => write!(f, "PATCH"),
            Method::OPTIONS => write!(f, "OPTIONS"),
            Method::HEAD => write!(f, "HEAD"),
        }
    }
}

/// Result of one HTTP exchange as reported by a transport.
///
/// A failed exchange has no status code; its content length reads as zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Response { status_code: u16, content_length: u64 },
    Failed { error: String },
}

impl Outcome {
    pub fn response(status_code: u16, content_length: u64) -> Self {
        Outcome::Response { status_code, content_length }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Outcome::Failed { error: error.into() }
    }
}

/// Pair used to decide whether two responses are "the same".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EquivalenceKey {
    pub status_code: u16,
    pub content_length: u64,
}

/// One identity's outcome against one endpoint/method pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOutcome {
    pub identity_id: String,
    pub method: Method,
    pub outcome: Outcome,
}

impl RequestOutcome {
    pub fn new(identity_id: impl Into<String>, method: Method, outcome: Outcome) -> Self {
        Self {
            identity_id: identity_id.into(),
            method,
            outcome,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self.outcome {
            Outcome::Response { status_code, .. } => Some(status_code),
            Outcome::Failed { .. } => None,
        }
    }

    pub fn content_length(&self) -> u64 {
        match self.outcome {
            Outcome::Response { content_length, .. } => content_length,
            Outcome::Failed { .. } => 0,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Failed { error } => Some(error),
            Outcome::Response { .. } => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, Outcome::Failed { .. })
    }

    /// Key for equivalence grouping; failed outcomes have none and never join a class.
    pub fn equivalence_key(&self) -> Option<EquivalenceKey> {
        match self.outcome {
            Outcome::Response { status_code, content_length } => Some(EquivalenceKey {
                status_code,
                content_length,
            }),
            Outcome::Failed { .. } => None,
        }
    }
}

/// Identity id -> outcome for a single endpoint/method pair, in probe order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutcomeTable {
    endpoint: String,
    method: Method,
    entries: Vec<RequestOutcome>,
}

impl OutcomeTable {
    pub fn new(endpoint: impl Into<String>, method: Method) -> Self {
        Self {
            endpoint: endpoint.into(),
            method,
            entries: Vec::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// Record an outcome. A second outcome for the same identity replaces
    /// the first in place, so each identity keeps exactly one entry.
    pub fn insert(&mut self, outcome: RequestOutcome) {
        match self
            .entries
            .iter_mut()
            .find(|e| e.identity_id == outcome.identity_id)
        {
            Some(existing) => *existing = outcome,
            None => self.entries.push(outcome),
        }
    }

    pub fn get(&self, identity_id: &str) -> Option<&RequestOutcome> {
        self.entries.iter().find(|e| e.identity_id == identity_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RequestOutcome> {
        self.entries.iter()
    }

    pub fn identity_ids(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.identity_id.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when there was at least one identity and every request failed.
    pub fn all_failed(&self) -> bool {
        !self.entries.is_empty() && self.entries.iter().all(RequestOutcome::is_failure)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FindingKind {
    #[serde(rename = "IDOR")]
    Idor,
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FindingKind::Idor => write!(f, "IDOR"),
        }
    }
}

/// Probable unauthorized shared access: several identities got the same successful response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    #[serde(rename = "type")]
    pub kind: FindingKind,
    pub endpoint: String,
    pub status_code: u16,
    pub content_length: u64,
    #[serde(rename = "affected_users")]
    pub affected_identities: Vec<String>,
    pub description: String,
}

impl Finding {
    pub fn new(endpoint: &str, key: EquivalenceKey, affected_identities: Vec<String>) -> Self {
        let description = format!(
            "Multiple users ({}) received identical responses",
            affected_identities.join(", ")
        );
        Self {
            kind: FindingKind::Idor,
            endpoint: endpoint.to_string(),
            status_code: key.status_code,
            content_length: key.content_length,
            affected_identities,
            description,
        }
    }
}

/// The persisted record handed to downstream tooling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub total_findings: usize,
    pub findings: Vec<Finding>,
    pub scan_time: DateTime<Local>,
}

impl ScanReport {
    pub fn new(findings: Vec<Finding>) -> Self {
        Self {
            total_findings: findings.len(),
            findings,
            scan_time: Local::now(),
        }
    }
}
