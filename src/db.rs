use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

pub const MIGRATIONS: &str = include_str!("schema.sql");

pub async fn init_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(8)
        .connect(database_url)
        .await
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(MIGRATIONS).execute(pool).await?;
    log::info!("Database migrations complete");
    Ok(())
}

/// Insert one user with the given role, skipping if the username exists.
/// Returns the user id either way.
async fn seed_user(
    pool: &PgPool,
    username: &str,
    password_hash: &str,
    full_name: &str,
    email: &str,
    role: &str,
) -> Result<i64, sqlx::Error> {
    if let Some((id,)) =
        sqlx::query_as::<_, (i64,)>("SELECT id FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(pool)
            .await?
    {
        return Ok(id);
    }
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO users (username, password, full_name, email, role) \
         VALUES ($1, $2, $3, $4, $5) RETURNING id",
    )
    .bind(username)
    .bind(password_hash)
    .bind(full_name)
    .bind(email)
    .bind(role)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

/// Seed base data: one account per role plus a starter dorm layout.
/// Idempotent — skips entirely when any user already exists.
pub async fn seed_base(pool: &PgPool, default_password_hash: &str) -> Result<(), sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        log::info!("Database already seeded ({count} users), skipping base seed");
        return Ok(());
    }

    seed_user(pool, "admin", default_password_hash, "Administrator", "admin@aau.edu.et", "admin").await?;

    let proctor =
        seed_user(pool, "proctor", default_password_hash, "Dorm Proctor", "proctor@aau.edu.et", "proctor").await?;
    let security =
        seed_user(pool, "security", default_password_hash, "Gate Security", "security@aau.edu.et", "security").await?;
    seed_user(pool, "staff", default_password_hash, "Maintenance Staff", "staff@aau.edu.et", "staff").await?;

    sqlx::query(
        "INSERT INTO security_officers (user_id, shift, assigned_post) VALUES ($1, 'day', 'Main Gate') \
         ON CONFLICT (user_id) DO NOTHING",
    )
    .bind(security)
    .execute(pool)
    .await?;

    let student =
        seed_user(pool, "student", default_password_hash, "John Student", "student@aau.edu.et", "student").await?;
    sqlx::query(
        "INSERT INTO student_profiles (user_id, student_code, student_type, academic_year, department) \
         VALUES ($1, 'STU-1200', 'government', 1, 'Computer Science') \
         ON CONFLICT (user_id) DO NOTHING",
    )
    .bind(student)
    .execute(pool)
    .await?;

    for (name, gender, location) in [
        ("Unity Dorm", "male", "Campus A"),
        ("Peace Dorm", "female", "Campus A"),
        ("Knowledge Hall", "male", "Campus B"),
    ] {
        let (dorm_id,): (i64,) = sqlx::query_as(
            "INSERT INTO dorms (name, gender, location) VALUES ($1, $2, $3) \
             ON CONFLICT (name) DO UPDATE SET location = EXCLUDED.location RETURNING id",
        )
        .bind(name)
        .bind(gender)
        .bind(location)
        .fetch_one(pool)
        .await?;

        for floor in 1..=2i64 {
            for n in 1..=4i64 {
                sqlx::query(
                    "INSERT INTO rooms (dorm_id, room_number, floor, capacity) VALUES ($1, $2, $3, 4) \
                     ON CONFLICT (dorm_id, room_number) DO NOTHING",
                )
                .bind(dorm_id)
                .bind(format!("{floor}{n:02}"))
                .bind(floor)
                .execute(pool)
                .await?;
            }
        }
    }

    log::info!("Base seed complete: one account per role, 3 dorms");
    Ok(())
}
