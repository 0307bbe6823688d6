// Session store for bac-hunter
// Loads identities from a JSON credential file: { "<id>": { "cookie": "..." | "token": "..." } }

use crate::error::ConfigError;
use crate::identity::{Credential, IdentityContext};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;
use tracing::debug;

/// Source of the identities a scan probes with.
pub trait SessionStore {
    /// Identity ids in probe order.
    fn list_identity_ids(&self) -> Vec<String>;

    fn get_identity(&self, identity_id: &str) -> Option<&IdentityContext>;

    fn len(&self) -> usize {
        self.list_identity_ids().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Deserialize)]
struct SessionSettings {
    cookie: Option<String>,
    token: Option<String>,
}

/// In-memory store of validated identities, ordered as configured.
#[derive(Debug, Clone, Default)]
pub struct SessionManager {
    identities: Vec<IdentityContext>,
}

impl SessionManager {
    pub fn load(config_path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = config_path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let manager = Self::from_json(&data)?;
        debug!(path = %path.display(), users = manager.identities.len(), "loaded session config");
        Ok(manager)
    }

    /// Parse and validate a credential document.
    pub fn from_json(data: &str) -> Result<Self, ConfigError> {
        let config: Map<String, Value> =
            serde_json::from_str(data).map_err(|e| ConfigError::Parse(e.to_string()))?;

        let mut identities = Vec::with_capacity(config.len());
        for (user_id, settings) in config {
            if !settings.is_object() {
                return Err(ConfigError::InvalidIdentity(user_id));
            }
            let settings: SessionSettings = serde_json::from_value(settings)
                .map_err(|_| ConfigError::InvalidIdentity(user_id.clone()))?;

            let cookie = settings.cookie.filter(|c| !c.is_empty());
            let token = settings.token.filter(|t| !t.is_empty());
            let credential = match (cookie, token) {
                (Some(cookie), None) => Credential::Cookie(cookie),
                (None, Some(token)) => Credential::BearerToken(token),
                (None, None) => return Err(ConfigError::MissingCredential(user_id)),
                (Some(_), Some(_)) => return Err(ConfigError::AmbiguousCredential(user_id)),
            };
            identities.push(IdentityContext::new(user_id, credential));
        }

        if identities.is_empty() {
            return Err(ConfigError::NoIdentities);
        }
        Ok(Self { identities })
    }

    /// Build a store from already-constructed identities. Later duplicates of an id are ignored.
    pub fn from_identities(identities: impl IntoIterator<Item = IdentityContext>) -> Self {
        let mut manager = Self::default();
        for identity in identities {
            if manager.get_identity(identity.identity_id()).is_none() {
                manager.identities.push(identity);
            }
        }
        manager
    }

    pub fn identities(&self) -> &[IdentityContext] {
        &self.identities
    }
}

impl SessionStore for SessionManager {
    fn list_identity_ids(&self) -> Vec<String> {
        self.identities
            .iter()
            .map(|i| i.identity_id().to_string())
            .collect()
    }

    fn get_identity(&self, identity_id: &str) -> Option<&IdentityContext> {
        self.identities
            .iter()
            .find(|i| i.identity_id() == identity_id)
    }

    fn len(&self) -> usize {
        self.identities.len()
    }
}
