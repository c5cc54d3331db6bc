use serde::Serialize;

use super::pending_index::PendingIndex;
use super::resolve::{Resolution, resolve};

/// State transition requested by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanAction {
    Verify,
    TakenOut,
}

impl ScanAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanAction::Verify => "verify",
            ScanAction::TakenOut => "taken-out",
        }
    }
}

/// A transition the store accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub code: String,
    pub new_status: String,
}

/// What the store said about one attempted transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionResult {
    Confirmed(Confirmation),
    /// No form for the target — the identifier or code matched nothing.
    NotFound,
    /// The form exists but the state machine forbids the transition
    /// (e.g. a second taken-out against an already-taken-out form).
    InvalidState { code: String, status: String },
}

/// Seam to the record store. The production implementation runs the
/// transition against Postgres; tests substitute an in-memory store.
pub trait TransitionStore {
    type Error: std::fmt::Display;

    async fn transition_by_id(
        &mut self,
        id: i64,
        action: ScanAction,
    ) -> Result<TransitionResult, Self::Error>;

    async fn transition_by_code(
        &mut self,
        code: &str,
        action: ScanAction,
    ) -> Result<TransitionResult, Self::Error>;
}

/// Result of one scan attempt, reported to the operator. Failures always
/// echo the raw payload — a scan is never silently dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Confirmed { code: String, new_status: String },
    UnresolvedScan { payload: String, reason: String },
    TransitionRejected { payload: String, reason: String },
    NetworkFailure { payload: String, reason: String },
}

/// Turn a scanned payload into one confirmed state transition.
///
/// Resolution must produce exactly one target before any mutating call is
/// issued; exactly one transition request is made per invocation and no
/// retries are performed. On `Confirmed` the entry is removed from the
/// pending index; on any failure the index is left untouched.
pub async fn resolve_and_confirm<S: TransitionStore>(
    payload: &str,
    index: &mut PendingIndex,
    action: ScanAction,
    store: &mut S,
) -> Outcome {
    let target = match resolve(payload, index, super::BASE_PATH) {
        Some(target) => target,
        None => {
            log::warn!("scan unresolved: {payload:?}");
            return Outcome::UnresolvedScan {
                payload: payload.to_string(),
                reason: "payload could not be mapped to any pending form".to_string(),
            };
        }
    };

    let attempted = match &target {
        Resolution::Record { id, .. } => store.transition_by_id(*id, action).await,
        Resolution::Endpoint { path } => match parse_endpoint(path) {
            // The endpoint embeds its own action segment; it overrides the
            // requested one. Only paths this service itself mints are
            // dispatched — anything else under our base path is a bad scan,
            // not a call to forward blindly.
            Some((code, endpoint_action)) => {
                store.transition_by_code(&code, endpoint_action).await
            }
            None => {
                log::warn!("scan endpoint not dispatchable: {path:?}");
                return Outcome::UnresolvedScan {
                    payload: payload.to_string(),
                    reason: format!("unrecognized endpoint path {path}"),
                };
            }
        },
    };

    match attempted {
        Ok(TransitionResult::Confirmed(c)) => {
            index.remove(&c.code);
            log::info!("scan confirmed: {} -> {}", c.code, c.new_status);
            Outcome::Confirmed {
                code: c.code,
                new_status: c.new_status,
            }
        }
        Ok(TransitionResult::NotFound) => Outcome::TransitionRejected {
            payload: payload.to_string(),
            reason: "no laundry form for the scanned target".to_string(),
        },
        Ok(TransitionResult::InvalidState { code, status }) => Outcome::TransitionRejected {
            payload: payload.to_string(),
            reason: format!("form {code} is '{status}' and cannot be marked {}", action.as_str()),
        },
        Err(e) => {
            log::error!("scan transition failed: {e}");
            Outcome::NetworkFailure {
                payload: payload.to_string(),
                reason: e.to_string(),
            }
        }
    }
}

/// Recognize a relative endpoint path minted by this service:
/// `/public/laundry/<code>/taken/` (or `.../verify/`).
fn parse_endpoint(path: &str) -> Option<(String, ScanAction)> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let laundry = segments
        .iter()
        .position(|s| s.eq_ignore_ascii_case("laundry"))?;
    let code = segments.get(laundry + 1)?;
    let action = match segments.get(laundry + 2).copied() {
        Some(s) if s.eq_ignore_ascii_case("taken") || s.eq_ignore_ascii_case("taken-out") => {
            ScanAction::TakenOut
        }
        Some(s) if s.eq_ignore_ascii_case("verify") => ScanAction::Verify,
        _ => return None,
    };
    Some((code.to_string(), action))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_parses_taken_path() {
        assert_eq!(
            parse_endpoint("/public/laundry/LAU-2025-7AE938/taken/"),
            Some(("LAU-2025-7AE938".to_string(), ScanAction::TakenOut))
        );
    }

    #[test]
    fn endpoint_parses_verify_path() {
        assert_eq!(
            parse_endpoint("/security/laundry/LAU-9981/verify/"),
            Some(("LAU-9981".to_string(), ScanAction::Verify))
        );
    }

    #[test]
    fn endpoint_without_action_segment_is_rejected() {
        assert_eq!(parse_endpoint("/public/laundry/LAU-9981/"), None);
        assert_eq!(parse_endpoint("/dorms/3/rooms/"), None);
    }
}
