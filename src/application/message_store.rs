use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::{ConversationId, Message, NewMessage};
use crate::error::{AppError, AppResult};
use crate::infrastructure::repositories::{ListingRepository, MessageRepository};

pub const MAX_MESSAGE_LENGTH: usize = 5000;

/// Validated access to the message log.
#[derive(Clone)]
pub struct MessageStore {
    message_repo: Arc<dyn MessageRepository>,
    listing_repo: Arc<dyn ListingRepository>,
}

impl MessageStore {
    pub fn new(
        message_repo: Arc<dyn MessageRepository>,
        listing_repo: Arc<dyn ListingRepository>,
    ) -> Self {
        Self {
            message_repo,
            listing_repo,
        }
    }

    pub async fn append(
        &self,
        sender_id: Uuid,
        receiver_id: Uuid,
        listing_id: Uuid,
        body: &str,
    ) -> AppResult<Message> {
        if body.trim().is_empty() {
            return Err(AppError::validation_error("message body cannot be empty"));
        }
        if body.chars().count() > MAX_MESSAGE_LENGTH {
            return Err(AppError::validation_error(format!(
                "message body cannot exceed {MAX_MESSAGE_LENGTH} characters"
            )));
        }

        let conversation_id = ConversationId::resolve(sender_id, receiver_id, listing_id)?;

        if self.listing_repo.find_by_id(listing_id).await?.is_none() {
            return Err(AppError::validation_error("listing does not exist"));
        }

        let created = self
            .message_repo
            .insert(&NewMessage {
                conversation_id,
                sender_id,
                receiver_id,
                listing_id,
                body: body.to_string(),
            })
            .await?;

        info!(
            message_id = created.id,
            conversation_id = %created.conversation_id,
            sender_id = %sender_id,
            receiver_id = %receiver_id,
            "message appended"
        );

        Ok(created)
    }

    pub async fn list_by_conversation(
        &self,
        conversation_id: &ConversationId,
    ) -> AppResult<Vec<Message>> {
        self.message_repo.find_by_conversation(conversation_id).await
    }

    pub async fn list_by_participant(&self, user_id: Uuid) -> AppResult<Vec<Message>> {
        self.message_repo.find_by_participant(user_id).await
    }

    pub async fn mark_read(
        &self,
        conversation_id: &ConversationId,
        receiver_id: Uuid,
    ) -> AppResult<u64> {
        let updated = self
            .message_repo
            .mark_read(conversation_id, receiver_id)
            .await?;
        debug!(
            conversation_id = %conversation_id,
            receiver_id = %receiver_id,
            updated,
            "mark-read applied"
        );
        Ok(updated)
    }
}
