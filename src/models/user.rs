use serde::Serialize;
use sqlx::PgPool;

/// Internal user struct for authentication — includes password hash.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: String,
}

/// Safe projection for API responses — no password hash.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: String,
}

impl From<User> for UserInfo {
    fn from(u: User) -> Self {
        UserInfo {
            id: u.id,
            username: u.username,
            full_name: u.full_name,
            email: u.email,
            phone: u.phone,
            role: u.role,
        }
    }
}

/// Find user by username for authentication. Returns internal User with hash.
pub async fn find_by_username(pool: &PgPool, username: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT id, username, password, full_name, email, phone, role \
         FROM users WHERE username = $1",
    )
    .bind(username)
    .fetch_optional(pool)
    .await
}

pub async fn find_info_by_id(pool: &PgPool, id: i64) -> Result<Option<UserInfo>, sqlx::Error> {
    sqlx::query_as::<_, UserInfo>(
        "SELECT id, username, full_name, email, phone, role FROM users WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}
