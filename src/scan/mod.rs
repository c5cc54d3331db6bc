//! QR resolution and confirmation for laundry pickup.
//!
//! A scanned payload (URL, bare id, bare code, or JSON blob) is resolved to
//! exactly one laundry form before any state transition is issued. The
//! resolution rules are ordered and the first matching rule wins — the
//! payload format is not under this service's control, so the ordering is
//! the contract.

pub mod confirm;
pub mod pending_index;
pub mod resolve;

pub use confirm::{Confirmation, Outcome, ScanAction, TransitionResult, TransitionStore, resolve_and_confirm};
pub use pending_index::PendingIndex;
pub use resolve::{Resolution, resolve};

/// Path segment under which the public QR endpoints live, relative to the
/// API base path. QR links are minted as
/// `<public base>/<BASE_PATH>/public/laundry/<code>/taken/`.
pub const BASE_PATH: &str = "aau-dhms-api";
