use serde::Serialize;
use sqlx::PgPool;

use crate::models::codes::generate_code;

// ---------- Status machine ----------

/// Lifecycle of a maintenance request: reported by a student, approved (or
/// rejected) by a proctor, claimed and worked by staff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceStatus {
    PendingProctor,
    Approved,
    Assigned,
    InProgress,
    Completed,
    Rejected,
}

impl MaintenanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaintenanceStatus::PendingProctor => "pending_proctor",
            MaintenanceStatus::Approved => "approved",
            MaintenanceStatus::Assigned => "assigned",
            MaintenanceStatus::InProgress => "in_progress",
            MaintenanceStatus::Completed => "completed",
            MaintenanceStatus::Rejected => "rejected",
        }
    }

    pub fn can_become(&self, to: MaintenanceStatus) -> bool {
        use MaintenanceStatus::*;
        matches!(
            (self, to),
            (PendingProctor, Approved)
                | (PendingProctor, Rejected)
                | (Approved, Assigned)
                | (Assigned, InProgress)
                | (InProgress, Completed)
        )
    }
}

// ---------- Types ----------

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MaintenanceRequest {
    pub id: i64,
    pub request_code: String,
    pub room_id: i64,
    pub room_number: String,
    pub dorm_name: String,
    pub student_id: i64,
    pub student_name: String,
    pub issue_type: String,
    pub title: String,
    pub description: String,
    pub urgency: String,
    pub status: String,
    pub assigned_staff_id: Option<i64>,
    pub rejection_reason: Option<String>,
    pub completion_notes: Option<String>,
    pub reported_date: String,
    pub approved_date: Option<String>,
    pub completed_date: Option<String>,
}

pub struct NewMaintenanceRequest {
    pub room_id: i64,
    pub issue_type: String,
    pub title: String,
    pub description: String,
    pub urgency: String,
}

/// Job counters for the staff dashboard.
#[derive(Debug, Clone, Default, Serialize, sqlx::FromRow)]
pub struct StaffStats {
    pub pending_jobs: i64,
    pub in_progress_jobs: i64,
    pub completed_jobs: i64,
}

const SELECT_REQUEST: &str = "\
    SELECT m.id, m.request_code, m.room_id, r.room_number, d.name AS dorm_name, \
           m.student_id, u.full_name AS student_name, \
           m.issue_type, m.title, m.description, m.urgency, m.status, \
           m.assigned_staff_id, m.rejection_reason, m.completion_notes, \
           m.reported_date::TEXT AS reported_date, \
           m.approved_date::TEXT AS approved_date, \
           m.completed_date::TEXT AS completed_date \
    FROM maintenance_requests m \
    JOIN rooms r ON r.id = m.room_id \
    JOIN dorms d ON d.id = r.dorm_id \
    JOIN users u ON u.id = m.student_id";

// ---------- Queries ----------

pub async fn create(
    pool: &PgPool,
    student_id: i64,
    new: &NewMaintenanceRequest,
) -> Result<MaintenanceRequest, sqlx::Error> {
    let code = generate_code("MNT");
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO maintenance_requests \
             (request_code, room_id, student_id, issue_type, title, description, urgency) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id",
    )
    .bind(&code)
    .bind(new.room_id)
    .bind(student_id)
    .bind(&new.issue_type)
    .bind(&new.title)
    .bind(&new.description)
    .bind(&new.urgency)
    .fetch_one(pool)
    .await?;

    sqlx::query_as::<_, MaintenanceRequest>(&format!("{SELECT_REQUEST} WHERE m.id = $1"))
        .bind(id)
        .fetch_one(pool)
        .await
}

pub async fn find_by_student(
    pool: &PgPool,
    student_id: i64,
) -> Result<Vec<MaintenanceRequest>, sqlx::Error> {
    sqlx::query_as::<_, MaintenanceRequest>(&format!(
        "{SELECT_REQUEST} WHERE m.student_id = $1 ORDER BY m.reported_date DESC"
    ))
    .bind(student_id)
    .fetch_all(pool)
    .await
}

pub async fn find_pending_proctor(pool: &PgPool) -> Result<Vec<MaintenanceRequest>, sqlx::Error> {
    sqlx::query_as::<_, MaintenanceRequest>(&format!(
        "{SELECT_REQUEST} WHERE m.status = 'pending_proctor' ORDER BY m.reported_date"
    ))
    .fetch_all(pool)
    .await
}

/// Approved jobs not yet claimed by any staff member.
pub async fn find_available_jobs(pool: &PgPool) -> Result<Vec<MaintenanceRequest>, sqlx::Error> {
    sqlx::query_as::<_, MaintenanceRequest>(&format!(
        "{SELECT_REQUEST} WHERE m.status = 'approved' AND m.assigned_staff_id IS NULL \
         ORDER BY m.urgency DESC, m.reported_date"
    ))
    .fetch_all(pool)
    .await
}

pub async fn find_by_staff(
    pool: &PgPool,
    staff_id: i64,
) -> Result<Vec<MaintenanceRequest>, sqlx::Error> {
    sqlx::query_as::<_, MaintenanceRequest>(&format!(
        "{SELECT_REQUEST} WHERE m.assigned_staff_id = $1 ORDER BY m.reported_date DESC"
    ))
    .bind(staff_id)
    .fetch_all(pool)
    .await
}

pub async fn count_pending_proctor(pool: &PgPool) -> Result<i64, sqlx::Error> {
    let (n,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM maintenance_requests WHERE status = 'pending_proctor'",
    )
    .fetch_one(pool)
    .await?;
    Ok(n)
}

pub async fn count_open_by_student(pool: &PgPool, student_id: i64) -> Result<i64, sqlx::Error> {
    let (n,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM maintenance_requests \
         WHERE student_id = $1 AND status NOT IN ('completed', 'rejected')",
    )
    .bind(student_id)
    .fetch_one(pool)
    .await?;
    Ok(n)
}

pub async fn staff_stats(pool: &PgPool, staff_id: i64) -> Result<StaffStats, sqlx::Error> {
    sqlx::query_as::<_, StaffStats>(
        "SELECT \
            (SELECT COUNT(*) FROM maintenance_requests \
             WHERE status = 'approved' AND assigned_staff_id IS NULL) AS pending_jobs, \
            (SELECT COUNT(*) FROM maintenance_requests \
             WHERE assigned_staff_id = $1 AND status IN ('assigned', 'in_progress')) AS in_progress_jobs, \
            (SELECT COUNT(*) FROM maintenance_requests \
             WHERE assigned_staff_id = $1 AND status = 'completed') AS completed_jobs",
    )
    .bind(staff_id)
    .fetch_one(pool)
    .await
}

// ---------- Transitions ----------

/// Guarded status move; true when the row actually changed. Zero rows
/// means missing or wrong-state — callers report 404/409 accordingly.
async fn guarded_update(pool: &PgPool, sql: &str, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(sql).bind(id).execute(pool).await?;
    Ok(result.rows_affected() == 1)
}

pub async fn approve(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    guarded_update(
        pool,
        "UPDATE maintenance_requests SET status = 'approved', approved_date = now() \
         WHERE id = $1 AND status = 'pending_proctor'",
        id,
    )
    .await
}

pub async fn reject(pool: &PgPool, id: i64, reason: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE maintenance_requests SET status = 'rejected', rejection_reason = $2 \
         WHERE id = $1 AND status = 'pending_proctor'",
    )
    .bind(id)
    .bind(reason)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// Staff claims an approved job; first claim wins.
pub async fn accept(pool: &PgPool, id: i64, staff_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE maintenance_requests SET status = 'assigned', assigned_staff_id = $2 \
         WHERE id = $1 AND status = 'approved' AND assigned_staff_id IS NULL",
    )
    .bind(id)
    .bind(staff_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn start(pool: &PgPool, id: i64, staff_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE maintenance_requests SET status = 'in_progress' \
         WHERE id = $1 AND status = 'assigned' AND assigned_staff_id = $2",
    )
    .bind(id)
    .bind(staff_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn complete(
    pool: &PgPool,
    id: i64,
    staff_id: i64,
    notes: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE maintenance_requests \
         SET status = 'completed', completed_date = now(), completion_notes = $3 \
         WHERE id = $1 AND status = 'in_progress' AND assigned_staff_id = $2",
    )
    .bind(id)
    .bind(staff_id)
    .bind(notes)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() == 1)
}

#[cfg(test)]
mod tests {
    use super::MaintenanceStatus;
    use MaintenanceStatus::*;

    #[test]
    fn job_flow_is_strictly_forward() {
        assert!(PendingProctor.can_become(Approved));
        assert!(Approved.can_become(Assigned));
        assert!(Assigned.can_become(InProgress));
        assert!(InProgress.can_become(Completed));
        assert!(PendingProctor.can_become(Rejected));
    }

    #[test]
    fn completed_and_rejected_are_terminal() {
        for to in [PendingProctor, Approved, Assigned, InProgress, Completed, Rejected] {
            assert!(!Completed.can_become(to));
            assert!(!Rejected.can_become(to));
        }
    }

    #[test]
    fn skipping_states_is_forbidden() {
        assert!(!PendingProctor.can_become(Assigned));
        assert!(!PendingProctor.can_become(InProgress));
        assert!(!Approved.can_become(InProgress));
        assert!(!Approved.can_become(Completed));
        assert!(!Assigned.can_become(Completed));
        assert!(!Approved.can_become(Rejected));
    }
}
