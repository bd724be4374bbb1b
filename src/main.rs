use std::io;
use std::sync::Arc;
use std::time::Instant;

use actix_web::dev::Service as _;
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::{middleware::Logger, web, App, HttpServer};
use classifieds_messaging::api::routes::{self, AppState};
use classifieds_messaging::application::MessageService;
use classifieds_messaging::config::{AppConfig, LoggingConfig};
use classifieds_messaging::infrastructure::db::{migrations::run_migrations, pool::create_pool};
use classifieds_messaging::infrastructure::repositories::{
    ListingRepositoryImpl, MessageRepositoryImpl,
};
use classifieds_messaging::middleware::request_logging::{
    create_request_span, get_client_ip, get_status_class, get_user_id_from_request,
};
use classifieds_messaging::security::{cors_middleware, security_headers};
use tracing::{error, info, warn, Instrument};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};
use uuid::Uuid;

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_new(&logging.level).unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if logging.json_format {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

fn startup_error(context: &str, error: impl std::fmt::Display) -> io::Error {
    io::Error::other(format!("{context}: {error}"))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()
        .map_err(|e| startup_error("failed to load application configuration", e))?;
    config
        .validate()
        .map_err(|e| startup_error("invalid application configuration", e))?;

    init_tracing(&config.logging);

    let pool = create_pool(&config.database)
        .await
        .map_err(|e| startup_error("failed to create database pool", e))?;

    run_migrations(&pool)
        .await
        .map_err(|e| startup_error("database migrations failed", e))?;

    let message_repo = Arc::new(MessageRepositoryImpl::new(pool.clone()));
    let listing_repo = Arc::new(ListingRepositoryImpl::new(pool.clone()));

    let state = AppState {
        message_service: Arc::new(MessageService::new(message_repo, listing_repo)),
        db_pool: Some(pool),
    };

    let bind_host = config.host.clone();
    let bind_port = config.port;
    let security_config = config.security.clone();

    info!(
        host = %bind_host,
        port = bind_port,
        environment = %config.environment,
        "starting messaging service"
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap_fn(|req, srv| {
                let request_id = Uuid::new_v4().to_string();
                let path = req.path().to_string();
                let method = req.method().to_string();
                let span = create_request_span(
                    &request_id,
                    &method,
                    &path,
                    &get_user_id_from_request(&req),
                    &get_client_ip(&req),
                );
                let start = Instant::now();

                let fut = srv.call(req);
                async move {
                    let mut response = fut.await?;
                    response.headers_mut().insert(
                        HeaderName::from_static("x-request-id"),
                        HeaderValue::from_str(&request_id)
                            .unwrap_or_else(|_| HeaderValue::from_static("invalid-request-id")),
                    );

                    let status = response.status().as_u16();
                    let latency_ms = start.elapsed().as_millis() as u64;
                    let status_class = get_status_class(status);

                    if status >= 500 {
                        error!(status, status_class, latency_ms, "request failed");
                    } else if status >= 400 {
                        warn!(status, status_class, latency_ms, "request rejected");
                    } else {
                        info!(status, status_class, latency_ms, "request completed");
                    }

                    Ok::<_, actix_web::Error>(response)
                }
                .instrument(span)
            })
            .wrap(cors_middleware(&security_config))
            .wrap(security_headers())
            .app_data(web::Data::new(state.clone()))
            .configure(routes::configure)
    })
    .bind((bind_host, bind_port))?
    .run()
    .await
}
