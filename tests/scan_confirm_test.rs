//! Scan confirmation tests — the full pipeline from raw payload to one
//! confirmed transition, run against an in-memory store.
//!
//! Covers:
//! - exactly one transition request per scan, no retries
//! - index entry removed only after a confirmed transition
//! - rejected and failed transitions leave the index untouched
//! - direct-endpoint URLs dispatch by code with the action from the path

use std::collections::HashMap;

use dhms::models::laundry::LaundryStatus;
use dhms::scan::{
    Confirmation, Outcome, PendingIndex, ScanAction, TransitionResult, TransitionStore,
    resolve_and_confirm,
};

/// In-memory laundry store. Tracks every transition request so tests can
/// assert on call counts.
struct MemStore {
    forms: HashMap<i64, (String, LaundryStatus)>,
    calls: usize,
    fail_with: Option<String>,
}

impl MemStore {
    fn new(forms: impl IntoIterator<Item = (i64, &'static str, LaundryStatus)>) -> Self {
        MemStore {
            forms: forms
                .into_iter()
                .map(|(id, code, status)| (id, (code.to_string(), status)))
                .collect(),
            calls: 0,
            fail_with: None,
        }
    }

    fn failing(reason: &str) -> Self {
        MemStore {
            forms: HashMap::new(),
            calls: 0,
            fail_with: Some(reason.to_string()),
        }
    }

    fn apply(&mut self, id: i64, action: ScanAction) -> TransitionResult {
        let Some((code, status)) = self.forms.get_mut(&id) else {
            return TransitionResult::NotFound;
        };
        let to = match action {
            ScanAction::Verify => LaundryStatus::Verified,
            ScanAction::TakenOut => LaundryStatus::TakenOut,
        };
        if status.can_become(to) {
            *status = to;
            TransitionResult::Confirmed(Confirmation {
                code: code.clone(),
                new_status: to.as_str().to_string(),
            })
        } else {
            TransitionResult::InvalidState {
                code: code.clone(),
                status: status.as_str().to_string(),
            }
        }
    }
}

impl TransitionStore for MemStore {
    type Error = String;

    async fn transition_by_id(
        &mut self,
        id: i64,
        action: ScanAction,
    ) -> Result<TransitionResult, String> {
        self.calls += 1;
        if let Some(reason) = &self.fail_with {
            return Err(reason.clone());
        }
        Ok(self.apply(id, action))
    }

    async fn transition_by_code(
        &mut self,
        code: &str,
        action: ScanAction,
    ) -> Result<TransitionResult, String> {
        self.calls += 1;
        if let Some(reason) = &self.fail_with {
            return Err(reason.clone());
        }
        let found = self
            .forms
            .iter()
            .find(|(_, (c, _))| c.eq_ignore_ascii_case(code))
            .map(|(id, _)| *id);
        match found {
            Some(id) => Ok(self.apply(id, action)),
            None => Ok(TransitionResult::NotFound),
        }
    }
}

fn pending(entries: &[(&str, i64)]) -> PendingIndex {
    PendingIndex::build(entries.iter().map(|(c, id)| (c.to_string(), *id)))
}

#[tokio::test]
async fn confirmed_scan_removes_its_index_entry() {
    let mut store = MemStore::new([(77, "LAU-9981", LaundryStatus::Verified)]);
    let mut index = pending(&[("LAU-9981", 77), ("LAU-5555", 55)]);

    let outcome =
        resolve_and_confirm("LAU-9981", &mut index, ScanAction::TakenOut, &mut store).await;

    assert_eq!(
        outcome,
        Outcome::Confirmed {
            code: "LAU-9981".to_string(),
            new_status: "taken_out".to_string(),
        }
    );
    assert_eq!(store.calls, 1);
    assert_eq!(index.get("LAU-9981"), None);
    assert_eq!(index.get("LAU-5555"), Some(55));
}

#[tokio::test]
async fn second_scan_of_same_form_is_rejected() {
    let mut store = MemStore::new([(77, "LAU-9981", LaundryStatus::Verified)]);
    let mut index = pending(&[("LAU-9981", 77)]);

    let first =
        resolve_and_confirm("LAU-9981", &mut index, ScanAction::TakenOut, &mut store).await;
    assert!(matches!(first, Outcome::Confirmed { .. }));

    // The code is gone from the index, but a re-fetched index (or a bare id
    // scan) can still reach the form; the state machine must refuse it.
    let second = resolve_and_confirm("77", &mut index, ScanAction::TakenOut, &mut store).await;
    match second {
        Outcome::TransitionRejected { payload, reason } => {
            assert_eq!(payload, "77");
            assert!(reason.contains("taken_out"), "reason: {reason}");
        }
        other => panic!("expected rejection, got {other:?}"),
    }
    assert_eq!(store.calls, 2);
}

#[tokio::test]
async fn unresolved_payload_never_touches_the_store() {
    let mut store = MemStore::new([(77, "LAU-9981", LaundryStatus::Approved)]);
    let mut index = pending(&[("LAU-9981", 77)]);

    let outcome = resolve_and_confirm(
        "https://example.com/totally/unrelated/",
        &mut index,
        ScanAction::TakenOut,
        &mut store,
    )
    .await;

    match outcome {
        Outcome::UnresolvedScan { payload, .. } => {
            assert_eq!(payload, "https://example.com/totally/unrelated/");
        }
        other => panic!("expected unresolved scan, got {other:?}"),
    }
    assert_eq!(store.calls, 0);
    assert_eq!(index.len(), 1);
}

#[tokio::test]
async fn store_failure_reports_network_failure_and_keeps_index() {
    let mut store = MemStore::failing("connection reset by peer");
    let mut index = pending(&[("LAU-9981", 77)]);

    let outcome =
        resolve_and_confirm("LAU-9981", &mut index, ScanAction::TakenOut, &mut store).await;

    assert_eq!(
        outcome,
        Outcome::NetworkFailure {
            payload: "LAU-9981".to_string(),
            reason: "connection reset by peer".to_string(),
        }
    );
    assert_eq!(store.calls, 1);
    assert_eq!(index.get("LAU-9981"), Some(77), "failed scans must not drop the entry");
}

#[tokio::test]
async fn rejected_transition_keeps_index_entry() {
    // Form already taken out; the index is stale.
    let mut store = MemStore::new([(77, "LAU-9981", LaundryStatus::TakenOut)]);
    let mut index = pending(&[("LAU-9981", 77)]);

    let outcome =
        resolve_and_confirm("LAU-9981", &mut index, ScanAction::TakenOut, &mut store).await;

    assert!(matches!(outcome, Outcome::TransitionRejected { .. }));
    assert_eq!(index.get("LAU-9981"), Some(77));
}

#[tokio::test]
async fn minted_url_dispatches_by_code_with_path_action() {
    let mut store = MemStore::new([(204, "LAU-2025-7AE938", LaundryStatus::Approved)]);
    let mut index = pending(&[("LAU-2025-7AE938", 204)]);

    // Requested action is Verify, but the scanned link says taken: the path
    // action wins because the link is what the student was issued.
    let outcome = resolve_and_confirm(
        "https://dhms.example.com/aau-dhms-api/public/laundry/LAU-2025-7AE938/taken/",
        &mut index,
        ScanAction::Verify,
        &mut store,
    )
    .await;

    assert_eq!(
        outcome,
        Outcome::Confirmed {
            code: "LAU-2025-7AE938".to_string(),
            new_status: "taken_out".to_string(),
        }
    );
    assert_eq!(index.get("LAU-2025-7AE938"), None);
}

#[tokio::test]
async fn unrecognized_path_under_base_is_not_dispatched() {
    let mut store = MemStore::new([(77, "LAU-9981", LaundryStatus::Approved)]);
    let mut index = pending(&[("LAU-9981", 77)]);

    // Carries the base path and a keyword, but no laundry code to act on.
    let outcome = resolve_and_confirm(
        "https://host/aau-dhms-api/laundry/verify/",
        &mut index,
        ScanAction::TakenOut,
        &mut store,
    )
    .await;

    assert!(matches!(outcome, Outcome::UnresolvedScan { .. }));
    assert_eq!(store.calls, 0);
}

#[tokio::test]
async fn json_payload_transitions_by_id() {
    let mut store = MemStore::new([(42, "LAU-1234", LaundryStatus::Approved)]);
    let mut index = PendingIndex::new();

    let outcome = resolve_and_confirm(
        r#"{"form_id": 42}"#,
        &mut index,
        ScanAction::Verify,
        &mut store,
    )
    .await;

    assert_eq!(
        outcome,
        Outcome::Confirmed {
            code: "LAU-1234".to_string(),
            new_status: "verified".to_string(),
        }
    );
}

#[tokio::test]
async fn unknown_id_is_rejected_with_payload_echo() {
    let mut store = MemStore::new([]);
    let mut index = PendingIndex::new();

    let outcome = resolve_and_confirm("204819", &mut index, ScanAction::TakenOut, &mut store).await;

    match outcome {
        Outcome::TransitionRejected { payload, .. } => assert_eq!(payload, "204819"),
        other => panic!("expected rejection, got {other:?}"),
    }
    assert_eq!(store.calls, 1);
}
