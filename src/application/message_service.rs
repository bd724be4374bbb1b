use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::api::dtos::{
    ConversationSummaryResponse, MessageResponse, ResolveConversationRequest,
    ResolveConversationResponse, SendMessageRequest,
};
use crate::application::{ConversationAggregator, MessageStore, ReadStateSynchronizer};
use crate::domain::ConversationId;
use crate::error::{AppError, AppResult};
use crate::infrastructure::repositories::{ListingRepository, MessageRepository};

/// Entry point for the HTTP layer; every method acts as `user_id`.
#[derive(Clone)]
pub struct MessageService {
    store: MessageStore,
    read_state: ReadStateSynchronizer,
    aggregator: ConversationAggregator,
    listing_repo: Arc<dyn ListingRepository>,
}

impl MessageService {
    pub fn new(
        message_repo: Arc<dyn MessageRepository>,
        listing_repo: Arc<dyn ListingRepository>,
    ) -> Self {
        let store = MessageStore::new(message_repo, listing_repo.clone());
        Self {
            read_state: ReadStateSynchronizer::new(store.clone()),
            aggregator: ConversationAggregator::new(store.clone()),
            store,
            listing_repo,
        }
    }

    pub async fn resolve_conversation(
        &self,
        user_id: Uuid,
        request: ResolveConversationRequest,
    ) -> AppResult<ResolveConversationResponse> {
        let conversation_id =
            ConversationId::resolve(user_id, request.other_user_id, request.listing_id)?;

        if self
            .listing_repo
            .find_by_id(request.listing_id)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound("listing not found".to_string()));
        }

        Ok(ResolveConversationResponse { conversation_id })
    }

    pub async fn send_message(
        &self,
        user_id: Uuid,
        request: SendMessageRequest,
    ) -> AppResult<MessageResponse> {
        request.validate()?;

        let (receiver_id, listing_id) = match request.conversation_id.as_deref() {
            Some(raw) => {
                let conversation_id = ConversationId::parse(raw)?;
                let receiver_id = conversation_id.other_participant(user_id).ok_or_else(|| {
                    AppError::Forbidden(
                        "You are not a participant in this conversation".to_string(),
                    )
                })?;

                let receiver_mismatch = request.receiver_id.is_some_and(|id| id != receiver_id);
                let listing_mismatch = request
                    .listing_id
                    .is_some_and(|id| id != conversation_id.listing_id());
                if receiver_mismatch || listing_mismatch {
                    return Err(AppError::validation_error(
                        "conversation_id does not match receiver_id and listing_id",
                    ));
                }

                (receiver_id, conversation_id.listing_id())
            }
            None => match (request.receiver_id, request.listing_id) {
                (Some(receiver_id), Some(listing_id)) => (receiver_id, listing_id),
                _ => {
                    return Err(AppError::validation_error(
                        "either conversation_id or receiver_id and listing_id are required",
                    ))
                }
            },
        };

        let message = self
            .store
            .append(user_id, receiver_id, listing_id, &request.body)
            .await?;
        Ok(message.into())
    }

    pub async fn open_conversation(
        &self,
        user_id: Uuid,
        conversation_id: &str,
    ) -> AppResult<Vec<MessageResponse>> {
        let conversation_id = ConversationId::parse(conversation_id)?;
        let messages = self
            .read_state
            .open_conversation(&conversation_id, user_id)
            .await?;
        Ok(messages.into_iter().map(MessageResponse::from).collect())
    }

    pub async fn peek_conversation(
        &self,
        user_id: Uuid,
        conversation_id: &str,
    ) -> AppResult<Vec<MessageResponse>> {
        let conversation_id = ConversationId::parse(conversation_id)?;
        let messages = self
            .read_state
            .peek_conversation(&conversation_id, user_id)
            .await?;
        Ok(messages.into_iter().map(MessageResponse::from).collect())
    }

    pub async fn list_conversations(
        &self,
        user_id: Uuid,
    ) -> AppResult<Vec<ConversationSummaryResponse>> {
        let summaries = self.aggregator.conversations_for(user_id).await?;

        let listing_ids: Vec<Uuid> = summaries
            .iter()
            .map(|summary| summary.listing_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let listings: HashMap<Uuid, _> = self
            .listing_repo
            .find_by_ids(&listing_ids)
            .await?
            .into_iter()
            .map(|listing| (listing.id, listing))
            .collect();

        info!(
            actor_user_id = %user_id,
            conversations = summaries.len(),
            "inbox aggregated"
        );

        Ok(summaries
            .into_iter()
            .map(|summary| {
                let listing = listings.get(&summary.listing_id);
                ConversationSummaryResponse::from_summary(summary, user_id, listing)
            })
            .collect())
    }
}
