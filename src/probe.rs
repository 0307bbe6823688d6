// Probe orchestrator for bac-hunter
// Sends one request per identity and assembles the endpoint's outcome table

use crate::identity::IdentityContext;
use crate::models::{Method, OutcomeTable, RequestOutcome};
use crate::transport::Transport;
use futures::stream::{self, StreamExt};
use tracing::debug;

pub struct ProbeOrchestrator<T: Transport> {
    transport: T,
    concurrency: usize,
}

impl<T: Transport> ProbeOrchestrator<T> {
    /// Sequential orchestrator: each identity's request completes before the next starts.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            concurrency: 1,
        }
    }

    /// Allow up to `concurrency` identity probes in flight at once (minimum 1).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn probe(&self, endpoint: &str, identities: &[&IdentityContext]) -> OutcomeTable {
        self.probe_with_method(endpoint, Method::GET, identities).await
    }

    /// Probe `endpoint` once per identity.
    ///
    /// The table holds exactly one entry per identity, in the order given,
    /// whether or not individual requests failed. Outcomes are independent:
    /// one identity's failure does not stop the others.
    pub async fn probe_with_method(
        &self,
        endpoint: &str,
        method: Method,
        identities: &[&IdentityContext],
    ) -> OutcomeTable {
        let outcomes: Vec<RequestOutcome> = stream::iter(identities.iter().copied())
            .map(|identity| async move {
                let outcome = self
                    .transport
                    .request(endpoint, method, Some(identity), None)
                    .await;
                RequestOutcome::new(identity.identity_id(), method, outcome)
            })
            // buffered (not buffer_unordered) keeps identity order
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut table = OutcomeTable::new(endpoint, method);
        for outcome in outcomes {
            debug!(
                endpoint,
                identity = %outcome.identity_id,
                status = ?outcome.status_code(),
                length = outcome.content_length(),
                error = ?outcome.error(),
                "probe outcome"
            );
            table.insert(outcome);
        }
        table
    }
}
