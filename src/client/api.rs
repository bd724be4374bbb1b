use async_trait::async_trait;
use reqwest::{header::ACCEPT, Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{error, warn};
use uuid::Uuid;

use crate::api::dtos::{
    ConversationSummaryResponse, ErrorResponse, MessageResponse, ResolveConversationRequest,
    ResolveConversationResponse, SendMessageRequest,
};
use crate::config::SyncConfig;
use crate::domain::ConversationId;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::USER_ID_HEADER;

const SERVICE_NAME: &str = "messaging-api";

/// The operations a messaging front end needs, as seen by one signed-in user.
#[async_trait]
pub trait MessagingApi: Send + Sync {
    async fn resolve_conversation(
        &self,
        other_user_id: Uuid,
        listing_id: Uuid,
    ) -> AppResult<ConversationId>;

    async fn send_message(&self, request: &SendMessageRequest) -> AppResult<MessageResponse>;

    /// Fetches the conversation and marks the caller's unread messages read.
    async fn open_conversation(
        &self,
        conversation_id: &ConversationId,
    ) -> AppResult<Vec<MessageResponse>>;

    /// Fetches the conversation without any read-state side effect.
    async fn peek_conversation(
        &self,
        conversation_id: &ConversationId,
    ) -> AppResult<Vec<MessageResponse>>;

    async fn list_conversations(&self) -> AppResult<Vec<ConversationSummaryResponse>>;
}

/// `MessagingApi` over HTTP, identifying as `user_id` through the gateway header.
pub struct HttpMessagingApi {
    base_url: String,
    user_id: Uuid,
    client: Client,
}

impl HttpMessagingApi {
    pub fn new(base_url: impl Into<String>, user_id: Uuid) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            user_id,
            client: Client::new(),
        }
    }

    pub fn from_config(config: &SyncConfig, user_id: Uuid) -> Self {
        Self::new(config.api_base_url.clone(), user_id)
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header(USER_ID_HEADER, self.user_id.to_string())
            .header(ACCEPT, "application/json")
    }

    async fn execute<T: DeserializeOwned>(&self, builder: RequestBuilder) -> AppResult<T> {
        let response = self.authorized(builder).send().await.map_err(|e| {
            warn!(error = %e, "messaging api request failed");
            AppError::ServiceUnavailable {
                service: SERVICE_NAME.to_string(),
                message: format!("request failed: {e}"),
            }
        })?;

        if !response.status().is_success() {
            return Err(handle_error(response).await);
        }

        response.json::<T>().await.map_err(|e| {
            error!(error = %e, "failed to parse messaging api response");
            AppError::InternalError(anyhow::anyhow!("failed to parse response: {e}"))
        })
    }
}

pub(crate) async fn handle_error(response: Response) -> AppError {
    let status = response.status();

    match response.json::<ErrorResponse>().await {
        Ok(body) => AppError::from_public(&body.code, body.message, body.details, SERVICE_NAME),
        Err(_) => {
            error!(status = %status, "messaging api returned unparsable error");
            match status.as_u16() {
                401 => AppError::Unauthorized,
                403 => AppError::Forbidden("Forbidden".to_string()),
                404 => AppError::NotFound("Not found".to_string()),
                500..=599 => AppError::ServiceUnavailable {
                    service: SERVICE_NAME.to_string(),
                    message: format!("upstream returned {status}"),
                },
                _ => AppError::InternalError(anyhow::anyhow!("unexpected status {status}")),
            }
        }
    }
}

#[async_trait]
impl MessagingApi for HttpMessagingApi {
    async fn resolve_conversation(
        &self,
        other_user_id: Uuid,
        listing_id: Uuid,
    ) -> AppResult<ConversationId> {
        let body = ResolveConversationRequest {
            other_user_id,
            listing_id,
        };
        let response: ResolveConversationResponse = self
            .execute(self.client.post(self.url("/conversations")).json(&body))
            .await?;
        Ok(response.conversation_id)
    }

    async fn send_message(&self, request: &SendMessageRequest) -> AppResult<MessageResponse> {
        self.execute(self.client.post(self.url("/messages")).json(request))
            .await
    }

    async fn open_conversation(
        &self,
        conversation_id: &ConversationId,
    ) -> AppResult<Vec<MessageResponse>> {
        let url = self.url(&format!("/conversations/{conversation_id}"));
        self.execute(self.client.get(url)).await
    }

    async fn peek_conversation(
        &self,
        conversation_id: &ConversationId,
    ) -> AppResult<Vec<MessageResponse>> {
        let url = self.url(&format!("/conversations/{conversation_id}/messages"));
        self.execute(self.client.get(url)).await
    }

    async fn list_conversations(&self) -> AppResult<Vec<ConversationSummaryResponse>> {
        self.execute(self.client.get(self.url("/conversations")))
            .await
    }
}
