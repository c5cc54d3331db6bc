use actix_session::SessionExt;
use actix_web::{
    Error, HttpResponse,
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next,
};

/// Middleware that rejects requests without an authenticated session.
/// This is a JSON API, so the answer is a 401 body, not a redirect.
pub async fn require_auth(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let session = req.get_session();
    let has_user = session.get::<i64>("user_id").unwrap_or(None).is_some();

    if !has_user {
        let response = HttpResponse::Unauthorized().json(serde_json::json!({
            "success": false,
            "error": "Not authenticated",
        }));
        return Ok(req.into_response(response).map_into_right_body());
    }

    next.call(req).await.map(|res| res.map_into_left_body())
}

/// CSRF guard for cookie-authenticated JSON mutations: POST/PUT/DELETE must
/// declare Content-Type: application/json. Browsers cannot send cross-origin
/// JSON with cookies via a simple form POST, so the check replaces tokens.
pub async fn require_json_content_type(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    use actix_web::http::Method;

    let method = req.method().clone();
    if method == Method::POST || method == Method::PUT || method == Method::DELETE {
        let is_json = req
            .headers()
            .get(actix_web::http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.starts_with("application/json"))
            .unwrap_or(false);

        if !is_json {
            let response = HttpResponse::UnsupportedMediaType().json(serde_json::json!({
                "success": false,
                "error": "Content-Type must be application/json",
            }));
            return Ok(req.into_response(response).map_into_right_body());
        }
    }

    next.call(req).await.map(|res| res.map_into_left_body())
}
