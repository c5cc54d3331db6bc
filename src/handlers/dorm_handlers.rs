use actix_session::Session;
use actix_web::{HttpResponse, web};
use sqlx::PgPool;

use crate::auth::session::require_user;
use crate::errors::AppError;
use crate::models::dorm;

/// GET /dorms/
pub async fn list_dorms(pool: web::Data<PgPool>, session: Session) -> Result<HttpResponse, AppError> {
    require_user(&session)?;
    let dorms = dorm::find_all(&pool).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true, "data": dorms })))
}

/// GET /dorms/{id}/rooms/
pub async fn list_rooms(
    pool: web::Data<PgPool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    require_user(&session)?;
    let rooms = dorm::find_rooms(&pool, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true, "data": rooms })))
}

/// GET /rooms/available/ — rooms with spare capacity, across all dorms.
pub async fn available_rooms(
    pool: web::Data<PgPool>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    require_user(&session)?;
    let rooms = dorm::find_available_rooms(&pool).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true, "data": rooms })))
}
