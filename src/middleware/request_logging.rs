//! Request context helpers used by the access-log middleware in `main`.
use actix_web::dev::ServiceRequest;
use tracing::Span;

use super::auth::USER_ID_HEADER;

/// Caller id as forwarded by the gateway, or "anonymous".
pub fn get_user_id_from_request(req: &ServiceRequest) -> String {
    req.headers()
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| "anonymous".to_string())
}

/// Uses actix-web's trusted proxy handling rather than raw X-Forwarded-For.
pub fn get_client_ip(req: &ServiceRequest) -> String {
    req.connection_info()
        .realip_remote_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

pub fn create_request_span(
    request_id: &str,
    method: &str,
    path: &str,
    user_id: &str,
    client_ip: &str,
) -> Span {
    tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        path = %path,
        user_id = %user_id,
        client_ip = %client_ip
    )
}

pub fn get_status_class(status: u16) -> &'static str {
    match status {
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "unknown",
    }
}
