use tracing::info;
use uuid::Uuid;

use crate::application::MessageStore;
use crate::domain::{ConversationId, DomainError, Message};
use crate::error::AppResult;

/// Marks a conversation read on behalf of whoever opens it.
#[derive(Clone)]
pub struct ReadStateSynchronizer {
    store: MessageStore,
}

impl ReadStateSynchronizer {
    pub fn new(store: MessageStore) -> Self {
        Self { store }
    }

    /// Returns the conversation as fetched, then flips the viewer's unread
    /// messages. Messages that land between the fetch and the update may be
    /// marked read without appearing in the returned snapshot.
    pub async fn open_conversation(
        &self,
        conversation_id: &ConversationId,
        viewer_id: Uuid,
    ) -> AppResult<Vec<Message>> {
        ensure_participant(conversation_id, viewer_id)?;

        let snapshot = self.store.list_by_conversation(conversation_id).await?;
        let updated = self.store.mark_read(conversation_id, viewer_id).await?;

        if updated > 0 {
            info!(
                conversation_id = %conversation_id,
                actor_user_id = %viewer_id,
                updated,
                "conversation marked read"
            );
        }

        Ok(snapshot)
    }

    /// Same snapshot as [`Self::open_conversation`] without touching read state.
    pub async fn peek_conversation(
        &self,
        conversation_id: &ConversationId,
        viewer_id: Uuid,
    ) -> AppResult<Vec<Message>> {
        ensure_participant(conversation_id, viewer_id)?;
        self.store.list_by_conversation(conversation_id).await
    }
}

fn ensure_participant(conversation_id: &ConversationId, user_id: Uuid) -> Result<(), DomainError> {
    if conversation_id.has_participant(user_id) {
        Ok(())
    } else {
        Err(DomainError::NotParticipant(
            "You are not a participant in this conversation".to_string(),
        ))
    }
}
