/// Unit tests for core bac-hunter models
/// Methods, request outcomes and the outcome table
use bac_hunter::models::{EquivalenceKey, Method, Outcome, OutcomeTable, RequestOutcome};

#[test]
fn test_method_display() {
    assert_eq!(Method::GET.to_string(), "GET");
    assert_eq!(Method::POST.to_string(), "POST");
    assert_eq!(Method::PUT.to_string(), "PUT");
    assert_eq!(Method::DELETE.to_string(), "DELETE");
    assert_eq!(Method::PATCH.to_string(), "PATCH");
    assert_eq!(Method::OPTIONS.to_string(), "OPTIONS");
    assert_eq!(Method::HEAD.to_string(), "HEAD");
}

#[test]
fn test_method_body_rule() {
    // Only writes carry a JSON body
    assert!(Method::POST.carries_body());
    assert!(Method::PUT.carries_body());
    assert!(Method::PATCH.carries_body());
    assert!(!Method::GET.carries_body());
    assert!(!Method::DELETE.carries_body());
    assert_eq!(Method::HEAD.as_reqwest(), reqwest::Method::HEAD);
}

#[test]
fn test_successful_outcome_accessors() {
    let outcome = RequestOutcome::new("admin", Method::GET, Outcome::response(200, 512));

    assert_eq!(outcome.status_code(), Some(200));
    assert_eq!(outcome.content_length(), 512);
    assert_eq!(outcome.error(), None);
    assert!(!outcome.is_failure());
    assert_eq!(
        outcome.equivalence_key(),
        Some(EquivalenceKey { status_code: 200, content_length: 512 })
    );
}

#[test]
fn test_failed_outcome_accessors() {
    // Failure has no status, zero length and no equivalence key
    let outcome = RequestOutcome::new("user1", Method::GET, Outcome::failed("timed out"));

    assert_eq!(outcome.status_code(), None);
    assert_eq!(outcome.content_length(), 0);
    assert_eq!(outcome.error(), Some("timed out"));
    assert!(outcome.is_failure());
    assert_eq!(outcome.equivalence_key(), None);
}

#[test]
fn test_outcome_table_one_entry_per_identity() {
    let mut table = OutcomeTable::new("https://t/a", Method::GET);
    table.insert(RequestOutcome::new("a", Method::GET, Outcome::failed("x")));
    table.insert(RequestOutcome::new("b", Method::GET, Outcome::response(200, 1)));
    table.insert(RequestOutcome::new("a", Method::GET, Outcome::response(404, 3)));

    assert_eq!(table.len(), 2);
    assert_eq!(table.identity_ids(), vec!["a", "b"]);
    assert_eq!(table.get("a").unwrap().status_code(), Some(404));
    assert!(table.get("c").is_none());
}

#[test]
fn test_outcome_table_all_failed() {
    let mut table = OutcomeTable::new("https://t/a", Method::GET);
    assert!(!table.all_failed(), "empty table is not unreachable");

    table.insert(RequestOutcome::new("a", Method::GET, Outcome::failed("dns")));
    table.insert(RequestOutcome::new("b", Method::GET, Outcome::failed("dns")));
    assert!(table.all_failed());

    table.insert(RequestOutcome::new("c", Method::GET, Outcome::response(500, 0)));
    assert!(!table.all_failed());
}
