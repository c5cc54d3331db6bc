use serde::Serialize;
use sqlx::PgPool;

use crate::models::codes::generate_code;
use crate::scan::{Confirmation, ScanAction, TransitionResult, TransitionStore};

// ---------- Status machine ----------

/// Lifecycle of a laundry form. Created by a student submission, approved
/// (or rejected) by a proctor, optionally verified by security, finally
/// marked taken out at the gate. `taken_out` and `rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LaundryStatus {
    PendingProctor,
    Approved,
    Verified,
    TakenOut,
    Rejected,
}

impl LaundryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LaundryStatus::PendingProctor => "pending_proctor",
            LaundryStatus::Approved => "approved",
            LaundryStatus::Verified => "verified",
            LaundryStatus::TakenOut => "taken_out",
            LaundryStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending_proctor" => Some(LaundryStatus::PendingProctor),
            "approved" => Some(LaundryStatus::Approved),
            "verified" => Some(LaundryStatus::Verified),
            "taken_out" => Some(LaundryStatus::TakenOut),
            "rejected" => Some(LaundryStatus::Rejected),
            _ => None,
        }
    }

    /// Whether the form may move from `self` to `to`. Any pair not listed
    /// is an invalid transition and must leave the record unchanged.
    pub fn can_become(&self, to: LaundryStatus) -> bool {
        use LaundryStatus::*;
        matches!(
            (self, to),
            (PendingProctor, Approved)
                | (PendingProctor, Rejected)
                | (Approved, Verified)
                | (Approved, TakenOut)
                | (Verified, TakenOut)
        )
    }

    /// States from which the given status is reachable in one step.
    fn sources(to: LaundryStatus) -> &'static [&'static str] {
        use LaundryStatus::*;
        match to {
            Approved | Rejected => &["pending_proctor"],
            Verified => &["approved"],
            TakenOut => &["approved", "verified"],
            PendingProctor => &[],
        }
    }
}

// ---------- Types ----------

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct LaundryForm {
    pub id: i64,
    pub form_code: String,
    pub student_id: i64,
    pub item_count: i64,
    pub item_list: String,
    pub special_instructions: String,
    pub status: String,
    pub verification_notes: String,
    pub rejection_reason: Option<String>,
    pub qr_link: String,
    pub submission_date: String,
    pub approved_date: Option<String>,
    pub verified_date: Option<String>,
    pub taken_out_date: Option<String>,
}

/// Form row joined with student identity, for proctor/security lists.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct LaundryFormWithStudent {
    pub id: i64,
    pub form_code: String,
    pub student_name: String,
    pub student_code: String,
    pub item_count: i64,
    pub item_list: String,
    pub special_instructions: String,
    pub status: String,
    pub submission_date: String,
    pub approved_date: Option<String>,
}

pub struct NewLaundryForm {
    pub item_count: i64,
    pub item_list: String,
    pub special_instructions: String,
}

/// Daily activity counters for the security dashboard.
#[derive(Debug, Clone, Default, Serialize, sqlx::FromRow)]
pub struct SecurityStats {
    pub pending_verification: i64,
    pub verified_today: i64,
    pub taken_out_today: i64,
}

const SELECT_FORM: &str = "\
    SELECT id, form_code, student_id, item_count, item_list, special_instructions, \
           status, verification_notes, rejection_reason, qr_link, \
           submission_date::TEXT AS submission_date, \
           approved_date::TEXT AS approved_date, \
           verified_date::TEXT AS verified_date, \
           taken_out_date::TEXT AS taken_out_date \
    FROM laundry_forms";

const SELECT_FORM_WITH_STUDENT: &str = "\
    SELECT f.id, f.form_code, u.full_name AS student_name, \
           COALESCE(sp.student_code, '') AS student_code, \
           f.item_count, f.item_list, f.special_instructions, f.status, \
           f.submission_date::TEXT AS submission_date, \
           f.approved_date::TEXT AS approved_date \
    FROM laundry_forms f \
    JOIN users u ON u.id = f.student_id \
    LEFT JOIN student_profiles sp ON sp.user_id = f.student_id";

// ---------- Queries ----------

/// Create a form for the student. The QR link encodes the public taken-out
/// endpoint for the generated code. Retries on the rare code collision.
pub async fn create(
    pool: &PgPool,
    student_id: i64,
    new: &NewLaundryForm,
    public_base_url: &str,
) -> Result<LaundryForm, sqlx::Error> {
    let mut last_err = sqlx::Error::RowNotFound;
    for _ in 0..5 {
        let code = generate_code("LAU");
        let qr_link = format!(
            "{}/{}/public/laundry/{}/taken/",
            public_base_url.trim_end_matches('/'),
            crate::scan::BASE_PATH,
            code
        );
        let inserted = sqlx::query_as::<_, LaundryForm>(&format!(
            "INSERT INTO laundry_forms \
                 (form_code, student_id, item_count, item_list, special_instructions, qr_link) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id, form_code, student_id, item_count, item_list, special_instructions, \
                       status, verification_notes, rejection_reason, qr_link, \
                       submission_date::TEXT AS submission_date, \
                       approved_date::TEXT AS approved_date, \
                       verified_date::TEXT AS verified_date, \
                       taken_out_date::TEXT AS taken_out_date"
        ))
        .bind(&code)
        .bind(student_id)
        .bind(new.item_count)
        .bind(&new.item_list)
        .bind(&new.special_instructions)
        .bind(&qr_link)
        .fetch_one(pool)
        .await;

        match inserted {
            Ok(form) => return Ok(form),
            Err(e) if e
                .as_database_error()
                .is_some_and(|d| d.is_unique_violation()) =>
            {
                last_err = e;
            }
            Err(e) => return Err(e),
        }
    }
    Err(last_err)
}

pub async fn find_by_student(pool: &PgPool, student_id: i64) -> Result<Vec<LaundryForm>, sqlx::Error> {
    sqlx::query_as::<_, LaundryForm>(&format!(
        "{SELECT_FORM} WHERE student_id = $1 ORDER BY submission_date DESC"
    ))
    .bind(student_id)
    .fetch_all(pool)
    .await
}

/// Forms awaiting proctor approval.
pub async fn find_pending_proctor(pool: &PgPool) -> Result<Vec<LaundryFormWithStudent>, sqlx::Error> {
    sqlx::query_as::<_, LaundryFormWithStudent>(&format!(
        "{SELECT_FORM_WITH_STUDENT} WHERE f.status = 'pending_proctor' ORDER BY f.submission_date"
    ))
    .fetch_all(pool)
    .await
}

/// Forms awaiting pickup verification at the gate — the source the
/// pending index is built from.
pub async fn find_pending_security(pool: &PgPool) -> Result<Vec<LaundryFormWithStudent>, sqlx::Error> {
    sqlx::query_as::<_, LaundryFormWithStudent>(&format!(
        "{SELECT_FORM_WITH_STUDENT} WHERE f.status IN ('approved', 'verified') \
         ORDER BY f.approved_date NULLS LAST, f.submission_date"
    ))
    .fetch_all(pool)
    .await
}

pub async fn find_public_by_code(
    pool: &PgPool,
    code: &str,
) -> Result<Option<LaundryFormWithStudent>, sqlx::Error> {
    sqlx::query_as::<_, LaundryFormWithStudent>(&format!(
        "{SELECT_FORM_WITH_STUDENT} WHERE UPPER(f.form_code) = UPPER($1)"
    ))
    .bind(code)
    .fetch_all(pool)
    .await
    .map(|mut v| if v.is_empty() { None } else { Some(v.remove(0)) })
}

pub async fn count_pending_by_student(pool: &PgPool, student_id: i64) -> Result<i64, sqlx::Error> {
    let (n,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM laundry_forms \
         WHERE student_id = $1 AND status IN ('pending_proctor', 'approved', 'verified')",
    )
    .bind(student_id)
    .fetch_one(pool)
    .await?;
    Ok(n)
}

pub async fn count_pending_proctor(pool: &PgPool) -> Result<i64, sqlx::Error> {
    let (n,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM laundry_forms WHERE status = 'pending_proctor'")
            .fetch_one(pool)
            .await?;
    Ok(n)
}

pub async fn security_stats(pool: &PgPool) -> Result<SecurityStats, sqlx::Error> {
    sqlx::query_as::<_, SecurityStats>(
        "SELECT \
            (SELECT COUNT(*) FROM laundry_forms WHERE status IN ('approved', 'verified')) AS pending_verification, \
            (SELECT COUNT(*) FROM laundry_forms WHERE verified_date >= date_trunc('day', now())) AS verified_today, \
            (SELECT COUNT(*) FROM laundry_forms WHERE taken_out_date >= date_trunc('day', now())) AS taken_out_today",
    )
    .fetch_one(pool)
    .await
}

// ---------- Transitions ----------

/// One guarded UPDATE: moves the form to `to` only when its current status
/// allows it, stamping the matching timestamp column. Zero rows means the
/// form is missing or in the wrong state — a follow-up SELECT distinguishes
/// the two without changing anything.
async fn transition_where(
    pool: &PgPool,
    target: TransitionTarget<'_>,
    to: LaundryStatus,
    extra_set: &str,
) -> Result<TransitionResult, sqlx::Error> {
    let sources: Vec<String> = LaundryStatus::sources(to)
        .iter()
        .map(|s| s.to_string())
        .collect();
    let (update_target, select_target) = match target {
        TransitionTarget::Id(_) => ("id = $2", "id = $1"),
        TransitionTarget::Code(_) => ("UPPER(form_code) = UPPER($2)", "UPPER(form_code) = UPPER($1)"),
    };

    let update_sql = format!(
        "UPDATE laundry_forms SET status = $1{extra_set} \
         WHERE {update_target} AND status = ANY($3) \
         RETURNING form_code"
    );
    let mut query = sqlx::query_as::<_, (String,)>(&update_sql).bind(to.as_str());
    query = match target {
        TransitionTarget::Id(id) => query.bind(id),
        TransitionTarget::Code(code) => query.bind(code),
    };
    let updated = query.bind(&sources).fetch_optional(pool).await?;

    if let Some((code,)) = updated {
        return Ok(TransitionResult::Confirmed(Confirmation {
            code,
            new_status: to.as_str().to_string(),
        }));
    }

    let current_sql = format!("SELECT form_code, status FROM laundry_forms WHERE {select_target}");
    let query = sqlx::query_as::<_, (String, String)>(&current_sql);
    let query = match target {
        TransitionTarget::Id(id) => query.bind(id),
        TransitionTarget::Code(code) => query.bind(code),
    };
    match query.fetch_optional(pool).await? {
        Some((code, status)) => Ok(TransitionResult::InvalidState { code, status }),
        None => Ok(TransitionResult::NotFound),
    }
}

enum TransitionTarget<'a> {
    Id(i64),
    Code(&'a str),
}

pub async fn approve(pool: &PgPool, id: i64) -> Result<TransitionResult, sqlx::Error> {
    transition_where(
        pool,
        TransitionTarget::Id(id),
        LaundryStatus::Approved,
        ", approved_date = now()",
    )
    .await
}

pub async fn reject(pool: &PgPool, id: i64, reason: &str) -> Result<TransitionResult, sqlx::Error> {
    let result = transition_where(
        pool,
        TransitionTarget::Id(id),
        LaundryStatus::Rejected,
        "",
    )
    .await?;
    if let TransitionResult::Confirmed(_) = &result {
        sqlx::query("UPDATE laundry_forms SET rejection_reason = $1 WHERE id = $2")
            .bind(reason)
            .bind(id)
            .execute(pool)
            .await?;
    }
    Ok(result)
}

pub async fn verify(pool: &PgPool, id: i64, notes: &str) -> Result<TransitionResult, sqlx::Error> {
    let result = transition_where(
        pool,
        TransitionTarget::Id(id),
        LaundryStatus::Verified,
        ", verified_date = now()",
    )
    .await?;
    if let TransitionResult::Confirmed(_) = &result {
        set_notes_by_id(pool, id, notes).await?;
    }
    Ok(result)
}

pub async fn take_out(pool: &PgPool, id: i64) -> Result<TransitionResult, sqlx::Error> {
    transition_where(
        pool,
        TransitionTarget::Id(id),
        LaundryStatus::TakenOut,
        ", taken_out_date = now()",
    )
    .await
}

pub async fn verify_by_code(
    pool: &PgPool,
    code: &str,
    notes: &str,
) -> Result<TransitionResult, sqlx::Error> {
    let result = transition_where(
        pool,
        TransitionTarget::Code(code),
        LaundryStatus::Verified,
        ", verified_date = now()",
    )
    .await?;
    if let TransitionResult::Confirmed(c) = &result {
        set_notes_by_code(pool, &c.code, notes).await?;
    }
    Ok(result)
}

pub async fn take_out_by_code(pool: &PgPool, code: &str) -> Result<TransitionResult, sqlx::Error> {
    transition_where(
        pool,
        TransitionTarget::Code(code),
        LaundryStatus::TakenOut,
        ", taken_out_date = now()",
    )
    .await
}

async fn set_notes_by_id(pool: &PgPool, id: i64, notes: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE laundry_forms SET verification_notes = $1 WHERE id = $2")
        .bind(notes)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

async fn set_notes_by_code(pool: &PgPool, code: &str, notes: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE laundry_forms SET verification_notes = $1 WHERE form_code = $2")
        .bind(notes)
        .bind(code)
        .execute(pool)
        .await?;
    Ok(())
}

// ---------- Scan store ----------

/// Production `TransitionStore` over Postgres. Scan-triggered verifies use
/// a fixed note — the operator has no free-text channel mid-scan.
pub struct PgLaundryStore<'a> {
    pub pool: &'a PgPool,
}

const SCAN_VERIFY_NOTES: &str = "Verified by security";

impl TransitionStore for PgLaundryStore<'_> {
    type Error = sqlx::Error;

    async fn transition_by_id(
        &mut self,
        id: i64,
        action: ScanAction,
    ) -> Result<TransitionResult, sqlx::Error> {
        match action {
            ScanAction::Verify => verify(self.pool, id, SCAN_VERIFY_NOTES).await,
            ScanAction::TakenOut => take_out(self.pool, id).await,
        }
    }

    async fn transition_by_code(
        &mut self,
        code: &str,
        action: ScanAction,
    ) -> Result<TransitionResult, sqlx::Error> {
        match action {
            ScanAction::Verify => verify_by_code(self.pool, code, SCAN_VERIFY_NOTES).await,
            ScanAction::TakenOut => take_out_by_code(self.pool, code).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::LaundryStatus;
    use LaundryStatus::*;

    #[test]
    fn forward_transitions_are_allowed() {
        assert!(PendingProctor.can_become(Approved));
        assert!(PendingProctor.can_become(Rejected));
        assert!(Approved.can_become(Verified));
        assert!(Approved.can_become(TakenOut));
        assert!(Verified.can_become(TakenOut));
    }

    #[test]
    fn terminal_states_accept_nothing() {
        for to in [PendingProctor, Approved, Verified, TakenOut, Rejected] {
            assert!(!TakenOut.can_become(to), "taken_out -> {to:?}");
            assert!(!Rejected.can_become(to), "rejected -> {to:?}");
        }
    }

    #[test]
    fn no_backward_or_skipping_transitions() {
        assert!(!Approved.can_become(PendingProctor));
        assert!(!Verified.can_become(Approved));
        assert!(!PendingProctor.can_become(Verified));
        assert!(!PendingProctor.can_become(TakenOut));
        assert!(!Approved.can_become(Rejected));
        assert!(!Verified.can_become(Rejected));
    }

    #[test]
    fn status_round_trips_through_strings() {
        for s in [PendingProctor, Approved, Verified, TakenOut, Rejected] {
            assert_eq!(LaundryStatus::parse(s.as_str()), Some(s));
        }
        assert_eq!(LaundryStatus::parse("unknown"), None);
    }
}
