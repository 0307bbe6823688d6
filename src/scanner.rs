// Scan driver for bac-hunter
// Probes each endpoint with every configured identity, classifies, and aggregates findings

use crate::classifier::EquivalenceClassifier;
use crate::identity::IdentityContext;
use crate::models::{Finding, OutcomeTable};
use crate::probe::ProbeOrchestrator;
use crate::session::SessionStore;
use crate::transport::Transport;
use tracing::{debug, info, warn};

/// Everything learned about one endpoint during a scan.
#[derive(Debug, Clone)]
pub struct EndpointReport<'a> {
    pub endpoint: &'a str,
    pub table: &'a OutcomeTable,
    pub findings: &'a [Finding],
}

impl EndpointReport<'_> {
    /// Every identity's request failed; the endpoint could not be assessed.
    pub fn unreachable(&self) -> bool {
        self.table.all_failed()
    }
}

/// Progress hooks for a reporting collaborator. All methods default to no-ops.
pub trait ScanObserver {
    fn on_scan_start(&mut self, _endpoint_count: usize, _identity_count: usize) {}

    fn on_endpoint(&mut self, _report: &EndpointReport<'_>) {}

    fn on_scan_complete(&mut self, _findings: &[Finding]) {}
}

/// Observer that ignores every event.
pub struct SilentObserver;

impl ScanObserver for SilentObserver {}

pub struct Scanner<'s, T: Transport, S: SessionStore> {
    orchestrator: ProbeOrchestrator<T>,
    classifier: EquivalenceClassifier,
    sessions: &'s S,
}

impl<'s, T: Transport, S: SessionStore> Scanner<'s, T, S> {
    pub fn new(
        orchestrator: ProbeOrchestrator<T>,
        classifier: EquivalenceClassifier,
        sessions: &'s S,
    ) -> Self {
        Self {
            orchestrator,
            classifier,
            sessions,
        }
    }

    pub fn orchestrator(&self) -> &ProbeOrchestrator<T> {
        &self.orchestrator
    }

    pub async fn scan(&self, endpoints: &[String]) -> Vec<Finding> {
        self.scan_with_observer(endpoints, &mut SilentObserver).await
    }

    /// Scan endpoints in the order given and return this run's findings.
    ///
    /// Each call starts from an empty aggregate. Endpoint failures are
    /// absorbed into the outcome tables, so the scan always runs to the end.
    pub async fn scan_with_observer(
        &self,
        endpoints: &[String],
        observer: &mut dyn ScanObserver,
    ) -> Vec<Finding> {
        let mut findings = Vec::new();
        observer.on_scan_start(endpoints.len(), self.sessions.len());
        info!(
            endpoints = endpoints.len(),
            users = self.sessions.len(),
            "starting IDOR scan"
        );

        for endpoint in endpoints {
            let identities = self.identities();
            let table = self.orchestrator.probe(endpoint, &identities).await;
            let endpoint_findings = self.classifier.classify(endpoint, &table);

            if table.all_failed() {
                debug!(%endpoint, "every identity failed; endpoint unreachable");
            }
            for finding in &endpoint_findings {
                warn!(
                    %endpoint,
                    status = finding.status_code,
                    length = finding.content_length,
                    users = %finding.affected_identities.join(", "),
                    "potential IDOR"
                );
            }

            observer.on_endpoint(&EndpointReport {
                endpoint: endpoint.as_str(),
                table: &table,
                findings: &endpoint_findings,
            });
            findings.extend(endpoint_findings);
        }

        info!(findings = findings.len(), "scan complete");
        observer.on_scan_complete(&findings);
        findings
    }

    /// Identities are re-read from the store per endpoint; ids the store no longer resolves are skipped.
    fn identities(&self) -> Vec<&'s IdentityContext> {
        let sessions: &'s S = self.sessions;
        sessions
            .list_identity_ids()
            .iter()
            .filter_map(|id| sessions.get_identity(id))
            .collect()
    }
}
