use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{ConversationId, Listing, Message, NewMessage};
use crate::error::AppResult;

/// Append-only message log. Implementations never delete or reorder rows;
/// the only mutation after insert is flipping `is_read`.
#[async_trait]
pub trait MessageRepository: Send + Sync {
    async fn insert(&self, message: &NewMessage) -> AppResult<Message>;

    /// Ascending by `created_at`, ties broken by `id`.
    async fn find_by_conversation(&self, conversation_id: &ConversationId)
        -> AppResult<Vec<Message>>;

    /// Every message the user sent or received. No ordering guarantee.
    async fn find_by_participant(&self, user_id: Uuid) -> AppResult<Vec<Message>>;

    /// Flips every unread message addressed to `receiver_id` in one atomic
    /// statement and returns how many rows changed.
    async fn mark_read(&self, conversation_id: &ConversationId, receiver_id: Uuid)
        -> AppResult<u64>;
}

#[async_trait]
pub trait ListingRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Listing>>;

    async fn find_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Listing>> {
        let mut listings = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(listing) = self.find_by_id(*id).await? {
                listings.push(listing);
            }
        }
        Ok(listings)
    }
}
