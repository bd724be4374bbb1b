use actix_web::{web, HttpResponse};

use crate::api::dtos::{ResolveConversationRequest, SendMessageRequest};
use crate::api::routes::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedUser;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/conversations")
            .route("", web::get().to(list_conversations))
            .route("", web::post().to(resolve_conversation))
            .route("/{id}", web::get().to(open_conversation))
            .route("/{id}/messages", web::get().to(peek_conversation)),
    )
    .route("/messages", web::post().to(send_message));
}

async fn list_conversations(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> AppResult<HttpResponse> {
    let result = state.message_service.list_conversations(user.id()).await?;
    Ok(HttpResponse::Ok().json(result))
}

async fn resolve_conversation(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    payload: web::Json<ResolveConversationRequest>,
) -> AppResult<HttpResponse> {
    let result = state
        .message_service
        .resolve_conversation(user.id(), payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(result))
}

/// Returns the conversation and marks the caller's unread messages read.
async fn open_conversation(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let result = state
        .message_service
        .open_conversation(user.id(), &path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(result))
}

async fn peek_conversation(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let result = state
        .message_service
        .peek_conversation(user.id(), &path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(result))
}

async fn send_message(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    payload: web::Json<SendMessageRequest>,
) -> AppResult<HttpResponse> {
    let result = state
        .message_service
        .send_message(user.id(), payload.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(result))
}
