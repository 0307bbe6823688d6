#![allow(dead_code)]

use async_trait::async_trait;
use bac_hunter::identity::IdentityContext;
use bac_hunter::models::{Method, Outcome};
use bac_hunter::transport::Transport;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Scripted transport: answers from a (url, identity) table, fails everything else.
#[derive(Default)]
pub struct FakeTransport {
    responses: HashMap<(String, String), Outcome>,
    delays: HashMap<String, Duration>,
    calls: Mutex<Vec<(String, Method, Option<String>)>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, url: &str, identity: &str, outcome: Outcome) -> Self {
        self.responses
            .insert((url.to_string(), identity.to_string()), outcome);
        self
    }

    pub fn delay(mut self, identity: &str, delay: Duration) -> Self {
        self.delays.insert(identity.to_string(), delay);
        self
    }

    pub fn calls(&self) -> Vec<(String, Method, Option<String>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn request(
        &self,
        url: &str,
        method: Method,
        identity: Option<&IdentityContext>,
        _body: Option<&Value>,
    ) -> Outcome {
        let id = identity.map(|i| i.identity_id().to_string());
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), method, id.clone()));

        let id = id.unwrap_or_default();
        if let Some(delay) = self.delays.get(&id) {
            tokio::time::sleep(*delay).await;
        }
        self.responses
            .get(&(url.to_string(), id))
            .cloned()
            .unwrap_or_else(|| Outcome::failed("connection refused"))
    }
}

/// admin (cookie), user1 (cookie), user2 (token)
pub fn three_identities() -> Vec<IdentityContext> {
    vec![
        IdentityContext::with_cookie("admin", "sessionid=admin123"),
        IdentityContext::with_cookie("user1", "sessionid=user1abc; csrftoken=x"),
        IdentityContext::with_token("user2", "Bearer user2token"),
    ]
}
