//! Laundry lifecycle tests — the full transition grid for laundry forms and
//! the maintenance job flow. Every pair not explicitly allowed must be
//! refused.

use dhms::models::laundry::LaundryStatus;
use dhms::models::maintenance::MaintenanceStatus;

const LAUNDRY_STATES: [LaundryStatus; 5] = [
    LaundryStatus::PendingProctor,
    LaundryStatus::Approved,
    LaundryStatus::Verified,
    LaundryStatus::TakenOut,
    LaundryStatus::Rejected,
];

#[test]
fn laundry_grid_matches_the_allowed_set() {
    use LaundryStatus::*;
    let allowed = [
        (PendingProctor, Approved),
        (PendingProctor, Rejected),
        (Approved, Verified),
        (Approved, TakenOut),
        (Verified, TakenOut),
    ];

    for from in LAUNDRY_STATES {
        for to in LAUNDRY_STATES {
            let expected = allowed.contains(&(from, to));
            assert_eq!(
                from.can_become(to),
                expected,
                "{from:?} -> {to:?} should be {expected}"
            );
        }
    }
}

#[test]
fn verification_is_optional_before_pickup() {
    // Security may skip verify and mark an approved form taken directly.
    assert!(LaundryStatus::Approved.can_become(LaundryStatus::TakenOut));
}

#[test]
fn rejection_is_proctor_only() {
    // Once past the proctor, a form can no longer be rejected.
    assert!(!LaundryStatus::Approved.can_become(LaundryStatus::Rejected));
    assert!(!LaundryStatus::Verified.can_become(LaundryStatus::Rejected));
}

#[test]
fn laundry_status_strings_are_stable() {
    assert_eq!(LaundryStatus::PendingProctor.as_str(), "pending_proctor");
    assert_eq!(LaundryStatus::TakenOut.as_str(), "taken_out");
    for s in LAUNDRY_STATES {
        assert_eq!(LaundryStatus::parse(s.as_str()), Some(s));
    }
    assert_eq!(LaundryStatus::parse("TAKEN_OUT"), None);
}

const MAINTENANCE_STATES: [MaintenanceStatus; 6] = [
    MaintenanceStatus::PendingProctor,
    MaintenanceStatus::Approved,
    MaintenanceStatus::Assigned,
    MaintenanceStatus::InProgress,
    MaintenanceStatus::Completed,
    MaintenanceStatus::Rejected,
];

#[test]
fn maintenance_grid_matches_the_allowed_set() {
    use MaintenanceStatus::*;
    let allowed = [
        (PendingProctor, Approved),
        (PendingProctor, Rejected),
        (Approved, Assigned),
        (Assigned, InProgress),
        (InProgress, Completed),
    ];

    for from in MAINTENANCE_STATES {
        for to in MAINTENANCE_STATES {
            let expected = allowed.contains(&(from, to));
            assert_eq!(
                from.can_become(to),
                expected,
                "{from:?} -> {to:?} should be {expected}"
            );
        }
    }
}
