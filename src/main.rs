use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::{App, HttpServer, cookie::Key, middleware, web};

use dhms::auth;
use dhms::config::AppConfig;
use dhms::db;
use dhms::handlers::{
    auth_handlers, dorm_handlers, proctor_handlers, public_handlers, security_handlers,
    staff_handlers, student_handlers,
};
use dhms::scan::BASE_PATH;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = AppConfig::from_env();

    let pool = db::init_pool(&config.database_url)
        .await
        .map_err(std::io::Error::other)?;
    db::run_migrations(&pool).await.map_err(std::io::Error::other)?;

    let admin_hash = auth::password::hash_password("admin123")
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    db::seed_base(&pool, &admin_hash)
        .await
        .map_err(std::io::Error::other)?;

    // Session encryption key — load from SESSION_KEY for sessions that
    // survive restarts.
    let secret_key = match std::env::var("SESSION_KEY") {
        Ok(val) if val.len() >= 64 => {
            log::info!("Using SESSION_KEY from environment");
            Key::from(val.as_bytes())
        }
        Ok(val) => {
            log::warn!(
                "SESSION_KEY too short ({} bytes, need 64+) — generating random key",
                val.len()
            );
            Key::generate()
        }
        Err(_) => {
            log::warn!("No SESSION_KEY set — generating random key (sessions lost on restart)");
            Key::generate()
        }
    };

    let limiter = auth::rate_limit::LoginRateLimiter::new();
    let bind_addr = config.bind_addr.clone();
    log::info!("Starting server at http://{bind_addr}");

    HttpServer::new(move || {
        let session_mw =
            SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                .cookie_secure(false)
                .cookie_http_only(true)
                .build();

        App::new()
            .wrap(session_mw)
            .wrap(middleware::Logger::default())
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(config.clone()))
            .app_data(web::Data::new(limiter.clone()))
            .service(
                web::scope(&format!("/{BASE_PATH}"))
                    // Public routes — login and the QR-link endpoints.
                    .route("/auth/login/", web::post().to(auth_handlers::login))
                    .route(
                        "/public/laundry/{code}/",
                        web::get().to(public_handlers::form_by_code),
                    )
                    .route(
                        "/public/laundry/{code}/taken/",
                        web::put().to(public_handlers::mark_taken),
                    )
                    // Everything else requires a session; mutating requests
                    // must carry a JSON content type.
                    .service(
                        web::scope("")
                            .wrap(actix_web::middleware::from_fn(
                                auth::middleware::require_json_content_type,
                            ))
                            .wrap(actix_web::middleware::from_fn(
                                auth::middleware::require_auth,
                            ))
                            .route("/auth/me/", web::get().to(auth_handlers::me))
                            .route("/auth/logout/", web::post().to(auth_handlers::logout))
                            // Students
                            .route("/students/dashboard/", web::get().to(student_handlers::dashboard))
                            .route("/students/room/", web::get().to(student_handlers::room_detail))
                            .route("/students/maintenance/", web::get().to(student_handlers::list_maintenance))
                            .route("/students/maintenance/", web::post().to(student_handlers::create_maintenance))
                            .route("/students/laundry/", web::get().to(student_handlers::list_laundry))
                            .route("/students/laundry/", web::post().to(student_handlers::create_laundry))
                            .route("/students/penalties/", web::get().to(student_handlers::list_penalties))
                            // Proctors
                            .route("/proctors/dashboard/", web::get().to(proctor_handlers::dashboard))
                            .route("/proctors/students/", web::get().to(proctor_handlers::students))
                            .route("/proctors/maintenance/pending/", web::get().to(proctor_handlers::pending_maintenance))
                            .route("/proctors/maintenance/{id}/approve/", web::put().to(proctor_handlers::approve_maintenance))
                            .route("/proctors/maintenance/{id}/reject/", web::put().to(proctor_handlers::reject_maintenance))
                            .route("/proctors/laundry/pending/", web::get().to(proctor_handlers::pending_laundry))
                            .route("/proctors/laundry/{id}/approve/", web::put().to(proctor_handlers::approve_laundry))
                            .route("/proctors/laundry/{id}/reject/", web::put().to(proctor_handlers::reject_laundry))
                            .route("/proctors/assign-room/", web::post().to(proctor_handlers::assign_room))
                            .route("/proctors/penalties/", web::post().to(proctor_handlers::create_penalty))
                            // Security
                            .route("/security/dashboard/", web::get().to(security_handlers::dashboard))
                            .route("/security/laundry/pending/", web::get().to(security_handlers::pending_laundry))
                            .route("/security/laundry/scan/", web::post().to(security_handlers::scan))
                            .route("/security/laundry/{id}/verify/", web::put().to(security_handlers::verify))
                            .route("/security/laundry/{id}/taken-out/", web::put().to(security_handlers::taken_out))
                            // Staff — /maintenance/my-jobs/ BEFORE /maintenance/{id}
                            .route("/staff/dashboard/", web::get().to(staff_handlers::dashboard))
                            .route("/staff/maintenance/", web::get().to(staff_handlers::available_jobs))
                            .route("/staff/maintenance/my-jobs/", web::get().to(staff_handlers::my_jobs))
                            .route("/staff/maintenance/{id}/accept/", web::put().to(staff_handlers::accept_job))
                            .route("/staff/maintenance/{id}/start/", web::put().to(staff_handlers::start_job))
                            .route("/staff/maintenance/{id}/complete/", web::put().to(staff_handlers::complete_job))
                            // Dorms and rooms
                            .route("/dorms/", web::get().to(dorm_handlers::list_dorms))
                            .route("/dorms/{id}/rooms/", web::get().to(dorm_handlers::list_rooms))
                            .route("/rooms/available/", web::get().to(dorm_handlers::available_rooms)),
                    ),
            )
            // Default 404 handler (must be registered last)
            .default_service(web::to(|| async {
                actix_web::HttpResponse::NotFound().json(serde_json::json!({
                    "success": false,
                    "error": "Not found",
                }))
            }))
    })
    .bind(&bind_addr)?
    .run()
    .await
}
