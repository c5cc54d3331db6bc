use actix_session::Session;

use crate::errors::AppError;

pub fn get_user_id(session: &Session) -> Option<i64> {
    session.get::<i64>("user_id").unwrap_or(None)
}

pub fn get_role(session: &Session) -> Option<String> {
    session.get::<String>("role").unwrap_or(None)
}

/// Return the session user id, or an authentication error.
pub fn require_user(session: &Session) -> Result<i64, AppError> {
    get_user_id(session).ok_or_else(|| AppError::Session("no user in session".to_string()))
}

/// Check that the session user holds the given role; admin passes every
/// role gate. Returns the user id for convenience.
pub fn require_role(session: &Session, role: &str) -> Result<i64, AppError> {
    let user_id = require_user(session)?;
    let actual = get_role(session)
        .ok_or_else(|| AppError::Session("no role in session".to_string()))?;
    if actual == role || actual == "admin" {
        Ok(user_id)
    } else {
        Err(AppError::PermissionDenied(role.to_string()))
    }
}
