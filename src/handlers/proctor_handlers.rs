use actix_session::Session;
use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::PgPool;

use crate::auth::session::require_role;
use crate::errors::AppError;
use crate::models::{laundry, maintenance, penalty, room, student};
use crate::scan::TransitionResult;

/// GET /proctors/dashboard/
pub async fn dashboard(pool: web::Data<PgPool>, session: Session) -> Result<HttpResponse, AppError> {
    require_role(&session, "proctor")?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": {
            "total_students": student::count_all(&pool).await?,
            "pending_maintenance": maintenance::count_pending_proctor(&pool).await?,
            "active_penalties": penalty::count_active(&pool).await?,
            "pending_laundry": laundry::count_pending_proctor(&pool).await?,
        },
    })))
}

/// GET /proctors/students/
pub async fn students(pool: web::Data<PgPool>, session: Session) -> Result<HttpResponse, AppError> {
    require_role(&session, "proctor")?;
    let roster = student::roster(&pool).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true, "data": roster })))
}

/// GET /proctors/maintenance/pending/
pub async fn pending_maintenance(
    pool: web::Data<PgPool>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    require_role(&session, "proctor")?;
    let requests = maintenance::find_pending_proctor(&pool).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true, "data": requests })))
}

/// PUT /proctors/maintenance/{id}/approve/
pub async fn approve_maintenance(
    pool: web::Data<PgPool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    require_role(&session, "proctor")?;
    let id = path.into_inner();

    if !maintenance::approve(&pool, id).await? {
        return Err(AppError::Conflict(
            "Request is not awaiting proctor approval".to_string(),
        ));
    }
    log::info!("maintenance {id} approved");
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}

#[derive(Deserialize)]
pub struct RejectBody {
    #[serde(default)]
    pub reason: String,
}

/// PUT /proctors/maintenance/{id}/reject/
pub async fn reject_maintenance(
    pool: web::Data<PgPool>,
    session: Session,
    path: web::Path<i64>,
    body: web::Json<RejectBody>,
) -> Result<HttpResponse, AppError> {
    require_role(&session, "proctor")?;
    let id = path.into_inner();

    if !maintenance::reject(&pool, id, &body.reason).await? {
        return Err(AppError::Conflict(
            "Request is not awaiting proctor approval".to_string(),
        ));
    }
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}

/// GET /proctors/laundry/pending/
pub async fn pending_laundry(
    pool: web::Data<PgPool>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    require_role(&session, "proctor")?;
    let forms = laundry::find_pending_proctor(&pool).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true, "data": { "forms": forms } })))
}

pub(crate) fn laundry_transition_response(result: TransitionResult) -> Result<HttpResponse, AppError> {
    match result {
        TransitionResult::Confirmed(c) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": { "form_code": c.code, "status": c.new_status },
        }))),
        TransitionResult::NotFound => Err(AppError::NotFound),
        TransitionResult::InvalidState { code, status } => Err(AppError::Conflict(format!(
            "Form {code} is '{status}' and cannot change state"
        ))),
    }
}

/// PUT /proctors/laundry/{id}/approve/
pub async fn approve_laundry(
    pool: web::Data<PgPool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    require_role(&session, "proctor")?;
    let result = laundry::approve(&pool, path.into_inner()).await?;
    laundry_transition_response(result)
}

/// PUT /proctors/laundry/{id}/reject/
pub async fn reject_laundry(
    pool: web::Data<PgPool>,
    session: Session,
    path: web::Path<i64>,
    body: web::Json<RejectBody>,
) -> Result<HttpResponse, AppError> {
    require_role(&session, "proctor")?;
    let result = laundry::reject(&pool, path.into_inner(), &body.reason).await?;
    laundry_transition_response(result)
}

#[derive(Deserialize)]
pub struct AssignRoomBody {
    pub student_id: i64,
    pub room_id: i64,
    pub assignment_date: NaiveDate,
    pub expected_check_out: Option<NaiveDate>,
}

/// POST /proctors/assign-room/
pub async fn assign_room(
    pool: web::Data<PgPool>,
    session: Session,
    body: web::Json<AssignRoomBody>,
) -> Result<HttpResponse, AppError> {
    require_role(&session, "proctor")?;

    match room::assign(
        &pool,
        body.student_id,
        body.room_id,
        body.assignment_date,
        body.expected_check_out,
    )
    .await?
    {
        Ok(assignment_id) => {
            log::info!("student {} assigned to room {}", body.student_id, body.room_id);
            Ok(HttpResponse::Created().json(serde_json::json!({
                "success": true,
                "data": { "id": assignment_id, "status": "active" },
            })))
        }
        Err(e) => Err(AppError::Conflict(e.message().to_string())),
    }
}

#[derive(Deserialize)]
pub struct PenaltyBody {
    pub student_id: i64,
    pub violation_type: String,
    pub description: String,
    #[serde(default)]
    pub duration_days: i64,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub consequences: String,
}

/// POST /proctors/penalties/
pub async fn create_penalty(
    pool: web::Data<PgPool>,
    session: Session,
    body: web::Json<PenaltyBody>,
) -> Result<HttpResponse, AppError> {
    let proctor_id = require_role(&session, "proctor")?;

    if body.violation_type.trim().is_empty() {
        return Err(AppError::Validation("violation_type is required".to_string()));
    }
    if body.duration_days < 0 {
        return Err(AppError::Validation("duration_days cannot be negative".to_string()));
    }

    let new = penalty::NewPenalty {
        student_id: body.student_id,
        violation_type: body.violation_type.clone(),
        description: body.description.clone(),
        duration_days: body.duration_days,
        start_date: body.start_date,
        consequences: body.consequences.clone(),
    };
    let created = penalty::create(&pool, proctor_id, &new).await?;
    log::info!("penalty {} assigned to student {}", created.penalty_code, created.student_id);

    Ok(HttpResponse::Created().json(serde_json::json!({ "success": true, "data": created })))
}
