use actix_session::Session;
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use sqlx::PgPool;

use crate::auth::session::require_role;
use crate::config::AppConfig;
use crate::errors::AppError;
use crate::models::{laundry, maintenance, penalty, room, student};

/// GET /students/dashboard/ — profile, current room, attention counters.
pub async fn dashboard(pool: web::Data<PgPool>, session: Session) -> Result<HttpResponse, AppError> {
    let user_id = require_role(&session, "student")?;

    let profile = student::find_profile(&pool, user_id)
        .await?
        .ok_or(AppError::NotFound)?;
    let assigned = room::find_active_by_student(&pool, user_id).await?;

    let room_view = match &assigned {
        Some(a) => {
            let roommates = room::find_roommates(&pool, a.room_id, user_id).await?;
            Some(serde_json::json!({
                "id": a.room_id,
                "room_number": a.room_number,
                "dorm_name": a.dorm_name,
                "floor": a.floor,
                "check_in_date": a.assignment_date,
                "expected_check_out": a.expected_check_out,
                "roommate": roommates.first(),
            }))
        }
        None => None,
    };

    let stats = serde_json::json!({
        "active_penalties": penalty::count_active_by_student(&pool, user_id).await?,
        "pending_maintenance": maintenance::count_open_by_student(&pool, user_id).await?,
        "pending_laundry": laundry::count_pending_by_student(&pool, user_id).await?,
    });

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": { "student": profile, "room": room_view, "stats": stats },
    })))
}

/// GET /students/room/ — room detail plus all roommates.
pub async fn room_detail(pool: web::Data<PgPool>, session: Session) -> Result<HttpResponse, AppError> {
    let user_id = require_role(&session, "student")?;

    let assigned = room::find_active_by_student(&pool, user_id)
        .await?
        .ok_or(AppError::NotFound)?;
    let roommates = room::find_roommates(&pool, assigned.room_id, user_id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": { "room": assigned, "roommates": roommates },
    })))
}

/// GET /students/maintenance/
pub async fn list_maintenance(
    pool: web::Data<PgPool>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let user_id = require_role(&session, "student")?;
    let requests = maintenance::find_by_student(&pool, user_id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true, "data": requests })))
}

#[derive(Deserialize)]
pub struct MaintenanceRequestBody {
    pub room_id: i64,
    pub issue_type: String,
    pub title: String,
    pub description: String,
    pub urgency: String,
}

/// POST /students/maintenance/
pub async fn create_maintenance(
    pool: web::Data<PgPool>,
    session: Session,
    body: web::Json<MaintenanceRequestBody>,
) -> Result<HttpResponse, AppError> {
    let user_id = require_role(&session, "student")?;

    if body.title.trim().is_empty() {
        return Err(AppError::Validation("title is required".to_string()));
    }

    let new = maintenance::NewMaintenanceRequest {
        room_id: body.room_id,
        issue_type: body.issue_type.clone(),
        title: body.title.trim().to_string(),
        description: body.description.clone(),
        urgency: body.urgency.clone(),
    };
    let request = maintenance::create(&pool, user_id, &new).await?;
    log::info!("maintenance {} reported by user {user_id}", request.request_code);

    Ok(HttpResponse::Created().json(serde_json::json!({ "success": true, "data": request })))
}

/// GET /students/laundry/
pub async fn list_laundry(pool: web::Data<PgPool>, session: Session) -> Result<HttpResponse, AppError> {
    let user_id = require_role(&session, "student")?;
    let forms = laundry::find_by_student(&pool, user_id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true, "data": forms })))
}

#[derive(Deserialize)]
pub struct LaundryRequestBody {
    pub item_count: i64,
    pub item_list: String,
    #[serde(default)]
    pub special_instructions: String,
}

/// POST /students/laundry/ — creates the form and mints its QR link.
pub async fn create_laundry(
    pool: web::Data<PgPool>,
    session: Session,
    body: web::Json<LaundryRequestBody>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, AppError> {
    let user_id = require_role(&session, "student")?;

    if body.item_count < 1 {
        return Err(AppError::Validation("item_count must be at least 1".to_string()));
    }

    let new = laundry::NewLaundryForm {
        item_count: body.item_count,
        item_list: body.item_list.clone(),
        special_instructions: body.special_instructions.clone(),
    };
    let form = laundry::create(&pool, user_id, &new, &config.public_base_url).await?;
    log::info!("laundry {} submitted by user {user_id}", form.form_code);

    Ok(HttpResponse::Created().json(serde_json::json!({ "success": true, "data": form })))
}

/// GET /students/penalties/
pub async fn list_penalties(
    pool: web::Data<PgPool>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let user_id = require_role(&session, "student")?;
    let penalties = penalty::find_by_student(&pool, user_id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": { "penalties": penalties },
    })))
}
