use actix_web::{HttpResponse, web};
use sqlx::PgPool;

use crate::errors::AppError;
use crate::handlers::proctor_handlers::laundry_transition_response;
use crate::models::laundry;

/// GET /public/laundry/{code}/ — unauthenticated form lookup, the landing
/// page behind a printed QR code.
pub async fn form_by_code(
    pool: web::Data<PgPool>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let form = laundry::find_public_by_code(&pool, &path)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true, "data": form })))
}

/// PUT /public/laundry/{code}/taken/ — the endpoint QR links point at.
pub async fn mark_taken(
    pool: web::Data<PgPool>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let result = laundry::take_out_by_code(&pool, &path).await?;
    if let crate::scan::TransitionResult::Confirmed(c) = &result {
        log::info!("laundry {} taken out via public link", c.code);
    }
    laundry_transition_response(result)
}
