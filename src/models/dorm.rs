use serde::Serialize;
use sqlx::PgPool;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Dorm {
    pub id: i64,
    pub name: String,
    pub gender: String,
    pub location: String,
    pub total_rooms: i64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Room {
    pub id: i64,
    pub dorm_id: i64,
    pub dorm_name: String,
    pub room_number: String,
    pub floor: i64,
    pub capacity: i64,
    pub current_occupancy: i64,
}

const SELECT_ROOM: &str = "\
    SELECT r.id, r.dorm_id, d.name AS dorm_name, r.room_number, r.floor, \
           r.capacity, r.current_occupancy \
    FROM rooms r \
    JOIN dorms d ON d.id = r.dorm_id";

pub async fn find_all(pool: &PgPool) -> Result<Vec<Dorm>, sqlx::Error> {
    sqlx::query_as::<_, Dorm>(
        "SELECT d.id, d.name, d.gender, d.location, \
                (SELECT COUNT(*) FROM rooms r WHERE r.dorm_id = d.id) AS total_rooms \
         FROM dorms d ORDER BY d.name",
    )
    .fetch_all(pool)
    .await
}

pub async fn find_rooms(pool: &PgPool, dorm_id: i64) -> Result<Vec<Room>, sqlx::Error> {
    sqlx::query_as::<_, Room>(&format!(
        "{SELECT_ROOM} WHERE r.dorm_id = $1 ORDER BY r.room_number"
    ))
    .bind(dorm_id)
    .fetch_all(pool)
    .await
}

/// Rooms with at least one free bed, across all dorms. Backs the proctor's
/// room-assignment picker.
pub async fn find_available_rooms(pool: &PgPool) -> Result<Vec<Room>, sqlx::Error> {
    sqlx::query_as::<_, Room>(&format!(
        "{SELECT_ROOM} WHERE r.current_occupancy < r.capacity \
         ORDER BY d.name, r.room_number"
    ))
    .fetch_all(pool)
    .await
}

pub async fn find_room_by_id(pool: &PgPool, room_id: i64) -> Result<Option<Room>, sqlx::Error> {
    sqlx::query_as::<_, Room>(&format!("{SELECT_ROOM} WHERE r.id = $1"))
        .bind(room_id)
        .fetch_optional(pool)
        .await
}
