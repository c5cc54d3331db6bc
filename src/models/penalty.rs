use chrono::{Duration, NaiveDate};
use serde::Serialize;
use sqlx::PgPool;

use crate::models::codes::generate_code;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Penalty {
    pub id: i64,
    pub penalty_code: String,
    pub student_id: i64,
    pub student_name: String,
    pub violation_type: String,
    pub description: String,
    pub duration_days: i64,
    pub start_date: String,
    pub end_date: Option<String>,
    pub consequences: String,
    pub status: String,
    pub assigned_date: String,
}

pub struct NewPenalty {
    pub student_id: i64,
    pub violation_type: String,
    pub description: String,
    pub duration_days: i64,
    pub start_date: NaiveDate,
    pub consequences: String,
}

const SELECT_PENALTY: &str = "\
    SELECT p.id, p.penalty_code, p.student_id, u.full_name AS student_name, \
           p.violation_type, p.description, p.duration_days, \
           p.start_date::TEXT AS start_date, p.end_date::TEXT AS end_date, \
           p.consequences, p.status, p.assigned_date::TEXT AS assigned_date \
    FROM penalties p \
    JOIN users u ON u.id = p.student_id";

/// Assign a penalty. End date is start + duration; a zero duration leaves
/// it open-ended.
pub async fn create(
    pool: &PgPool,
    assigned_by: i64,
    new: &NewPenalty,
) -> Result<Penalty, sqlx::Error> {
    let code = generate_code("PEN");
    let end_date = (new.duration_days > 0)
        .then(|| new.start_date + Duration::days(new.duration_days));

    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO penalties \
             (penalty_code, student_id, assigned_by, violation_type, description, \
              duration_days, start_date, end_date, consequences) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING id",
    )
    .bind(&code)
    .bind(new.student_id)
    .bind(assigned_by)
    .bind(&new.violation_type)
    .bind(&new.description)
    .bind(new.duration_days)
    .bind(new.start_date)
    .bind(end_date)
    .bind(&new.consequences)
    .fetch_one(pool)
    .await?;

    sqlx::query_as::<_, Penalty>(&format!("{SELECT_PENALTY} WHERE p.id = $1"))
        .bind(id)
        .fetch_one(pool)
        .await
}

pub async fn find_by_student(pool: &PgPool, student_id: i64) -> Result<Vec<Penalty>, sqlx::Error> {
    sqlx::query_as::<_, Penalty>(&format!(
        "{SELECT_PENALTY} WHERE p.student_id = $1 ORDER BY p.assigned_date DESC"
    ))
    .bind(student_id)
    .fetch_all(pool)
    .await
}

pub async fn count_active_by_student(pool: &PgPool, student_id: i64) -> Result<i64, sqlx::Error> {
    let (n,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM penalties WHERE student_id = $1 AND status = 'active'",
    )
    .bind(student_id)
    .fetch_one(pool)
    .await?;
    Ok(n)
}

pub async fn count_active(pool: &PgPool) -> Result<i64, sqlx::Error> {
    let (n,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM penalties WHERE status = 'active'")
            .fetch_one(pool)
            .await?;
    Ok(n)
}
