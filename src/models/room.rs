use chrono::NaiveDate;
use serde::Serialize;
use sqlx::PgPool;

/// A student's active room assignment with the room and dorm joined in.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AssignedRoom {
    pub assignment_id: i64,
    pub room_id: i64,
    pub room_number: String,
    pub dorm_id: i64,
    pub dorm_name: String,
    pub floor: i64,
    pub capacity: i64,
    pub current_occupancy: i64,
    pub assignment_date: String,
    pub expected_check_out: Option<String>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Roommate {
    pub id: i64,
    pub full_name: String,
    pub student_code: String,
    pub academic_year: i64,
}

/// Why an assignment attempt was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignmentError {
    AlreadyAssigned,
    RoomFull,
    RoomNotFound,
}

impl AssignmentError {
    pub fn message(&self) -> &'static str {
        match self {
            AssignmentError::AlreadyAssigned => "Student already has an active room assignment",
            AssignmentError::RoomFull => "Room is at full capacity",
            AssignmentError::RoomNotFound => "Room does not exist",
        }
    }
}

pub async fn find_active_by_student(
    pool: &PgPool,
    student_id: i64,
) -> Result<Option<AssignedRoom>, sqlx::Error> {
    sqlx::query_as::<_, AssignedRoom>(
        "SELECT a.id AS assignment_id, r.id AS room_id, r.room_number, \
                d.id AS dorm_id, d.name AS dorm_name, r.floor, r.capacity, r.current_occupancy, \
                a.assignment_date::TEXT AS assignment_date, \
                a.expected_check_out::TEXT AS expected_check_out \
         FROM room_assignments a \
         JOIN rooms r ON r.id = a.room_id \
         JOIN dorms d ON d.id = r.dorm_id \
         WHERE a.student_id = $1 AND a.is_active \
         ORDER BY a.id DESC LIMIT 1",
    )
    .bind(student_id)
    .fetch_optional(pool)
    .await
}

/// Other students actively assigned to the same room.
pub async fn find_roommates(
    pool: &PgPool,
    room_id: i64,
    exclude_student_id: i64,
) -> Result<Vec<Roommate>, sqlx::Error> {
    sqlx::query_as::<_, Roommate>(
        "SELECT u.id, u.full_name, COALESCE(sp.student_code, '') AS student_code, \
                COALESCE(sp.academic_year, 1) AS academic_year \
         FROM room_assignments a \
         JOIN users u ON u.id = a.student_id \
         LEFT JOIN student_profiles sp ON sp.user_id = u.id \
         WHERE a.room_id = $1 AND a.is_active AND a.student_id <> $2 \
         ORDER BY u.full_name",
    )
    .bind(room_id)
    .bind(exclude_student_id)
    .fetch_all(pool)
    .await
}

/// Assign a student to a room. One active assignment per student; the
/// occupancy bump is guarded against over-capacity inside the same
/// transaction, so two concurrent assignments cannot oversell a bed.
pub async fn assign(
    pool: &PgPool,
    student_id: i64,
    room_id: i64,
    assignment_date: NaiveDate,
    expected_check_out: Option<NaiveDate>,
) -> Result<Result<i64, AssignmentError>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let (already,): (bool,) = sqlx::query_as(
        "SELECT EXISTS(SELECT 1 FROM room_assignments WHERE student_id = $1 AND is_active)",
    )
    .bind(student_id)
    .fetch_one(&mut *tx)
    .await?;
    if already {
        return Ok(Err(AssignmentError::AlreadyAssigned));
    }

    let bumped = sqlx::query(
        "UPDATE rooms SET current_occupancy = current_occupancy + 1 \
         WHERE id = $1 AND current_occupancy < capacity",
    )
    .bind(room_id)
    .execute(&mut *tx)
    .await?;
    if bumped.rows_affected() == 0 {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM rooms WHERE id = $1)")
                .bind(room_id)
                .fetch_one(&mut *tx)
                .await?;
        return Ok(Err(if exists {
            AssignmentError::RoomFull
        } else {
            AssignmentError::RoomNotFound
        }));
    }

    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO room_assignments (student_id, room_id, assignment_date, expected_check_out) \
         VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(student_id)
    .bind(room_id)
    .bind(assignment_date)
    .bind(expected_check_out)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(Ok(id))
}
