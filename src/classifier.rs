// Equivalence classifier for bac-hunter
// Groups outcomes by (status, length) and flags successful groups shared by several identities

use crate::models::{EquivalenceKey, Finding, OutcomeTable};
use std::collections::{BTreeSet, HashMap};

/// Status codes that count as "the caller was given the resource".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuccessPolicy {
    statuses: BTreeSet<u16>,
}

impl Default for SuccessPolicy {
    fn default() -> Self {
        Self {
            statuses: BTreeSet::from([200]),
        }
    }
}

impl SuccessPolicy {
    /// An empty iterator falls back to the default `{200}`.
    pub fn new(statuses: impl IntoIterator<Item = u16>) -> Self {
        let statuses: BTreeSet<u16> = statuses.into_iter().collect();
        if statuses.is_empty() {
            return Self::default();
        }
        Self { statuses }
    }

    pub fn is_success(&self, status_code: u16) -> bool {
        self.statuses.contains(&status_code)
    }

    pub fn statuses(&self) -> impl Iterator<Item = u16> + '_ {
        self.statuses.iter().copied()
    }
}

/// Identities whose outcomes share one equivalence key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquivalenceClass {
    pub key: EquivalenceKey,
    pub members: Vec<String>,
}

/// Partition the table's non-failed outcomes by equivalence key.
///
/// Classes are ordered by first appearance of their key and members keep
/// table order. Failed outcomes are dropped before grouping.
pub fn group_outcomes(table: &OutcomeTable) -> Vec<EquivalenceClass> {
    let mut classes: Vec<EquivalenceClass> = Vec::new();
    let mut index: HashMap<EquivalenceKey, usize> = HashMap::new();

    for outcome in table.iter() {
        let Some(key) = outcome.equivalence_key() else {
            continue;
        };
        let slot = *index.entry(key).or_insert_with(|| {
            classes.push(EquivalenceClass {
                key,
                members: Vec::new(),
            });
            classes.len() - 1
        });
        classes[slot].members.push(outcome.identity_id.clone());
    }

    classes
}

#[derive(Debug, Clone, Default)]
pub struct EquivalenceClassifier {
    policy: SuccessPolicy,
}

impl EquivalenceClassifier {
    pub fn new(policy: SuccessPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &SuccessPolicy {
        &self.policy
    }

    /// One finding per class with a successful status and two or more members.
    ///
    /// Identical error pages (two users both denied with 403) are never
    /// flagged. Equal length is a proxy for equal content, so distinct
    /// payloads of coincidentally equal length will still be reported.
    pub fn classify(&self, endpoint: &str, table: &OutcomeTable) -> Vec<Finding> {
        group_outcomes(table)
            .into_iter()
            .filter(|class| class.members.len() > 1 && self.policy.is_success(class.key.status_code))
            .map(|class| Finding::new(endpoint, class.key, class.members))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Method, Outcome, RequestOutcome};

    fn table(entries: &[(&str, Outcome)]) -> OutcomeTable {
        let mut table = OutcomeTable::new("https://t/api/orders/42", Method::GET);
        for (id, outcome) in entries {
            table.insert(RequestOutcome::new(*id, Method::GET, outcome.clone()));
        }
        table
    }

    #[test]
    fn classes_ordered_by_first_appearance() {
        let t = table(&[
            ("a", Outcome::response(403, 10)),
            ("b", Outcome::response(200, 5)),
            ("c", Outcome::failed("timeout")),
            ("d", Outcome::response(403, 10)),
        ]);
        let classes = group_outcomes(&t);
        assert_eq!(classes.len(), 2);
        assert_eq!(classes[0].key.status_code, 403);
        assert_eq!(classes[0].members, vec!["a", "d"]);
        assert_eq!(classes[1].members, vec!["b"]);
    }

    #[test]
    fn empty_policy_falls_back_to_200() {
        let policy = SuccessPolicy::new(Vec::new());
        assert!(policy.is_success(200));
        assert!(!policy.is_success(204));
    }

    #[test]
    fn widened_policy_flags_shared_201() {
        let t = table(&[("a", Outcome::response(201, 9)), ("b", Outcome::response(201, 9))]);
        assert!(EquivalenceClassifier::default().classify("e", &t).is_empty());
        let widened = EquivalenceClassifier::new(SuccessPolicy::new([200, 201]));
        assert_eq!(widened.classify("e", &t).len(), 1);
    }
}
