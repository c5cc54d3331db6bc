use serde::Serialize;
use sqlx::PgPool;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct StudentProfile {
    pub id: i64,
    pub student_code: String,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub student_type: String,
    pub academic_year: i64,
    pub department: String,
}

/// Roster row for the proctor's student list.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct RosterEntry {
    pub id: i64,
    pub student_code: String,
    pub full_name: String,
    pub room_number: Option<String>,
    pub dorm_name: Option<String>,
    pub penalties_count: i64,
}

pub async fn find_profile(pool: &PgPool, user_id: i64) -> Result<Option<StudentProfile>, sqlx::Error> {
    sqlx::query_as::<_, StudentProfile>(
        "SELECT u.id, COALESCE(sp.student_code, '') AS student_code, u.full_name, u.email, \
                u.phone, COALESCE(sp.student_type, 'government') AS student_type, \
                COALESCE(sp.academic_year, 1) AS academic_year, \
                COALESCE(sp.department, '') AS department \
         FROM users u \
         LEFT JOIN student_profiles sp ON sp.user_id = u.id \
         WHERE u.id = $1 AND u.role = 'student'",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

/// All students with their active room and open penalty count.
pub async fn roster(pool: &PgPool) -> Result<Vec<RosterEntry>, sqlx::Error> {
    sqlx::query_as::<_, RosterEntry>(
        "SELECT u.id, COALESCE(sp.student_code, '') AS student_code, u.full_name, \
                r.room_number, d.name AS dorm_name, \
                (SELECT COUNT(*) FROM penalties p \
                 WHERE p.student_id = u.id AND p.status = 'active') AS penalties_count \
         FROM users u \
         LEFT JOIN student_profiles sp ON sp.user_id = u.id \
         LEFT JOIN room_assignments a ON a.student_id = u.id AND a.is_active \
         LEFT JOIN rooms r ON r.id = a.room_id \
         LEFT JOIN dorms d ON d.id = r.dorm_id \
         WHERE u.role = 'student' \
         ORDER BY u.full_name",
    )
    .fetch_all(pool)
    .await
}

pub async fn count_all(pool: &PgPool) -> Result<i64, sqlx::Error> {
    let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE role = 'student'")
        .fetch_one(pool)
        .await?;
    Ok(n)
}

/// Security officer detail shown on the gate dashboard.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OfficerInfo {
    pub full_name: String,
    pub shift: String,
    pub assigned_post: String,
}

pub async fn find_officer(pool: &PgPool, user_id: i64) -> Result<Option<OfficerInfo>, sqlx::Error> {
    sqlx::query_as::<_, OfficerInfo>(
        "SELECT u.full_name, COALESCE(so.shift, 'day') AS shift, \
                COALESCE(so.assigned_post, 'Main Gate') AS assigned_post \
         FROM users u \
         LEFT JOIN security_officers so ON so.user_id = u.id \
         WHERE u.id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}
