use actix_web::{HttpResponse, ResponseError};
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Db(sqlx::Error),
    Session(String),
    PermissionDenied(String),
    Validation(String),
    Conflict(String),
    Hash(String),
    NotFound,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Db(e) => write!(f, "Database error: {e}"),
            AppError::Session(e) => write!(f, "Session error: {e}"),
            AppError::PermissionDenied(role) => write!(f, "Requires role: {role}"),
            AppError::Validation(e) => write!(f, "Validation error: {e}"),
            AppError::Conflict(e) => write!(f, "Conflict: {e}"),
            AppError::Hash(e) => write!(f, "Hash error: {e}"),
            AppError::NotFound => write!(f, "Not found"),
        }
    }
}

fn json_error(status: actix_web::http::StatusCode, error: &str) -> HttpResponse {
    HttpResponse::build(status).json(serde_json::json!({
        "success": false,
        "error": error,
    }))
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        use actix_web::http::StatusCode;
        match self {
            AppError::NotFound => json_error(StatusCode::NOT_FOUND, "Not found"),
            AppError::Session(_) => json_error(StatusCode::UNAUTHORIZED, "Not authenticated"),
            AppError::PermissionDenied(role) => {
                json_error(StatusCode::FORBIDDEN, &format!("Requires {role} role"))
            }
            AppError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, msg),
            AppError::Conflict(msg) => json_error(StatusCode::CONFLICT, msg),
            _ => {
                log::error!("{self}");
                json_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => AppError::NotFound,
            other => AppError::Db(other),
        }
    }
}
