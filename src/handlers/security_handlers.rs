use actix_session::Session;
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use sqlx::PgPool;

use crate::auth::session::require_role;
use crate::errors::AppError;
use crate::handlers::proctor_handlers::laundry_transition_response;
use crate::models::laundry::{self, PgLaundryStore};
use crate::models::student;
use crate::scan::{PendingIndex, ScanAction, resolve_and_confirm};

/// GET /security/dashboard/ — officer info and today's counters.
pub async fn dashboard(pool: web::Data<PgPool>, session: Session) -> Result<HttpResponse, AppError> {
    let user_id = require_role(&session, "security")?;

    let officer = student::find_officer(&pool, user_id)
        .await?
        .ok_or(AppError::NotFound)?;
    let stats = laundry::security_stats(&pool).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": { "security": officer, "stats": stats },
    })))
}

/// GET /security/laundry/pending/ — forms awaiting pickup verification.
pub async fn pending_laundry(
    pool: web::Data<PgPool>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    require_role(&session, "security")?;
    let forms = laundry::find_pending_security(&pool).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true, "data": { "forms": forms } })))
}

#[derive(Deserialize)]
pub struct VerifyBody {
    #[serde(default)]
    pub verification_notes: String,
}

/// PUT /security/laundry/{id}/verify/
pub async fn verify(
    pool: web::Data<PgPool>,
    session: Session,
    path: web::Path<i64>,
    body: web::Json<VerifyBody>,
) -> Result<HttpResponse, AppError> {
    require_role(&session, "security")?;
    let notes = if body.verification_notes.trim().is_empty() {
        "Verified by security"
    } else {
        body.verification_notes.trim()
    };
    let result = laundry::verify(&pool, path.into_inner(), notes).await?;
    laundry_transition_response(result)
}

/// PUT /security/laundry/{id}/taken-out/
pub async fn taken_out(
    pool: web::Data<PgPool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    require_role(&session, "security")?;
    let result = laundry::take_out(&pool, path.into_inner()).await?;
    laundry_transition_response(result)
}

#[derive(Deserialize)]
pub struct ScanBody {
    pub qr_code: String,
    /// Optional override; scanning defaults to marking the form taken out.
    #[serde(default)]
    pub action: Option<String>,
}

/// POST /security/laundry/scan/ — resolve a raw scan payload and confirm
/// the transition. Always answers 200 with the outcome so the operator
/// sees the raw payload and reason on failure; nothing is retried here.
pub async fn scan(
    pool: web::Data<PgPool>,
    session: Session,
    body: web::Json<ScanBody>,
) -> Result<HttpResponse, AppError> {
    require_role(&session, "security")?;

    let action = match body.action.as_deref() {
        None | Some("taken-out") | Some("taken_out") => ScanAction::TakenOut,
        Some("verify") => ScanAction::Verify,
        Some(other) => {
            return Err(AppError::Validation(format!("unknown action '{other}'")));
        }
    };

    // The index is rebuilt from the store per scan, so a stale client list
    // can only produce UnresolvedScan, never a wrong-target transition.
    let pending = laundry::find_pending_security(&pool).await?;
    let mut index = PendingIndex::build(
        pending.into_iter().map(|f| (f.form_code, f.id)),
    );

    let mut store = PgLaundryStore { pool: pool.get_ref() };
    let outcome = resolve_and_confirm(&body.qr_code, &mut index, action, &mut store).await;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true, "data": outcome })))
}
