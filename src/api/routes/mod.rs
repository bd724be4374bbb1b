use std::sync::Arc;

use actix_web::{web, HttpResponse};
use sqlx::PgPool;

use crate::application::MessageService;
use crate::error::{AppError, AppResult};

pub mod messages;

#[derive(Clone)]
pub struct AppState {
    pub message_service: Arc<MessageService>,
    pub db_pool: Option<PgPool>,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .service(web::scope("/api/v1").configure(messages::configure))
        .route("/health", web::get().to(health))
        .route("/ready", web::get().to(ready));
}

/// Malformed JSON bodies get the same error envelope as every other failure.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::validation_error(err.to_string()).into())
}

async fn health() -> &'static str {
    "ok"
}

async fn ready(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let pool = state
        .db_pool
        .as_ref()
        .ok_or_else(|| AppError::store_unavailable("Service not ready: no database pool"))?;

    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await
        .map_err(|e| AppError::store_unavailable(format!("Service not ready: {e}")))?;
    Ok(HttpResponse::Ok().body("ready"))
}
