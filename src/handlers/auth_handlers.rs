use actix_session::Session;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::Deserialize;
use sqlx::PgPool;

use crate::auth::rate_limit::LoginRateLimiter;
use crate::auth::{password, session};
use crate::errors::AppError;
use crate::models::user::{self, UserInfo};

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

fn unauthorized(message: &str) -> HttpResponse {
    HttpResponse::Unauthorized().json(serde_json::json!({
        "success": false,
        "error": message,
    }))
}

/// POST /auth/login/ — verify credentials and establish the session.
pub async fn login(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    session: Session,
    body: web::Json<LoginRequest>,
    limiter: web::Data<LoginRateLimiter>,
) -> Result<HttpResponse, AppError> {
    // Rate-limit check before any database access.
    let ip = req
        .peer_addr()
        .map(|addr| addr.ip())
        .unwrap_or_else(|| std::net::IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED));

    if limiter.is_blocked(ip) {
        return Ok(HttpResponse::TooManyRequests().json(serde_json::json!({
            "success": false,
            "error": "Too many failed login attempts. Please try again later.",
        })));
    }

    let found = user::find_by_username(&pool, &body.username).await?;
    let Some(u) = found else {
        limiter.record_failure(ip);
        return Ok(unauthorized("Invalid username or password"));
    };

    if !password::verify_password(&body.password, &u.password)? {
        limiter.record_failure(ip);
        log::warn!("failed login for {}", u.username);
        return Ok(unauthorized("Invalid username or password"));
    }

    limiter.clear(ip);

    session
        .insert("user_id", u.id)
        .map_err(|e| AppError::Session(e.to_string()))?;
    session
        .insert("role", &u.role)
        .map_err(|e| AppError::Session(e.to_string()))?;
    session.renew();

    log::info!("login ok: {} ({})", u.username, u.role);

    let info: UserInfo = u.into();
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "user": info,
    })))
}

/// GET /auth/me/ — current session user.
pub async fn me(pool: web::Data<PgPool>, session: Session) -> Result<HttpResponse, AppError> {
    let user_id = session::require_user(&session)?;
    let info = user::find_info_by_id(&pool, user_id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "user": info,
    })))
}

/// POST /auth/logout/
pub async fn logout(session: Session) -> HttpResponse {
    session.purge();
    HttpResponse::Ok().json(serde_json::json!({ "success": true }))
}
