use actix_session::Session;
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use sqlx::PgPool;

use crate::auth::session::require_role;
use crate::errors::AppError;
use crate::models::maintenance;

/// GET /staff/dashboard/ — job counters for the signed-in staff member.
pub async fn dashboard(pool: web::Data<PgPool>, session: Session) -> Result<HttpResponse, AppError> {
    let staff_id = require_role(&session, "staff")?;
    let stats = maintenance::staff_stats(&pool, staff_id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true, "data": { "stats": stats } })))
}

/// GET /staff/maintenance/ — approved jobs nobody has claimed yet.
pub async fn available_jobs(
    pool: web::Data<PgPool>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    require_role(&session, "staff")?;
    let jobs = maintenance::find_available_jobs(&pool).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true, "data": jobs })))
}

/// GET /staff/maintenance/my-jobs/
pub async fn my_jobs(pool: web::Data<PgPool>, session: Session) -> Result<HttpResponse, AppError> {
    let staff_id = require_role(&session, "staff")?;
    let jobs = maintenance::find_by_staff(&pool, staff_id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true, "data": jobs })))
}

/// PUT /staff/maintenance/{id}/accept/ — claim an approved job. First claim wins;
/// a lost race answers 409 like any other wrong-state attempt.
pub async fn accept_job(
    pool: web::Data<PgPool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let staff_id = require_role(&session, "staff")?;
    let id = path.into_inner();

    if !maintenance::accept(&pool, id, staff_id).await? {
        return Err(AppError::Conflict(
            "Job is not available for assignment".to_string(),
        ));
    }
    log::info!("job {id} accepted by staff {staff_id}");
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}

/// PUT /staff/maintenance/{id}/start/
pub async fn start_job(
    pool: web::Data<PgPool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let staff_id = require_role(&session, "staff")?;
    let id = path.into_inner();

    if !maintenance::start(&pool, id, staff_id).await? {
        return Err(AppError::Conflict(
            "Job is not assigned to you or has already started".to_string(),
        ));
    }
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}

#[derive(Deserialize)]
pub struct CompleteBody {
    #[serde(default)]
    pub completion_notes: String,
}

/// PUT /staff/maintenance/{id}/complete/
pub async fn complete_job(
    pool: web::Data<PgPool>,
    session: Session,
    path: web::Path<i64>,
    body: web::Json<CompleteBody>,
) -> Result<HttpResponse, AppError> {
    let staff_id = require_role(&session, "staff")?;
    let id = path.into_inner();

    if !maintenance::complete(&pool, id, staff_id, &body.completion_notes).await? {
        return Err(AppError::Conflict(
            "Job is not in progress under your name".to_string(),
        ));
    }
    log::info!("job {id} completed by staff {staff_id}");
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}
