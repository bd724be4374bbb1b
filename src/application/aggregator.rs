use std::collections::hash_map::Entry;
use std::collections::HashMap;

use uuid::Uuid;

use crate::application::MessageStore;
use crate::domain::{ConversationSummary, Message};
use crate::error::AppResult;

/// Builds inbox rows by scanning the user's whole message history on every
/// call. Nothing is cached, so a read always reflects the latest append or
/// mark-read.
#[derive(Clone)]
pub struct ConversationAggregator {
    store: MessageStore,
}

impl ConversationAggregator {
    pub fn new(store: MessageStore) -> Self {
        Self { store }
    }

    pub async fn conversations_for(&self, user_id: Uuid) -> AppResult<Vec<ConversationSummary>> {
        let messages = self.store.list_by_participant(user_id).await?;
        Ok(summarize(user_id, messages))
    }
}

/// Groups `messages` by conversation, most recently active first.
///
/// Input order does not matter. Messages that do not involve `user_id`
/// are ignored.
pub fn summarize(user_id: Uuid, messages: Vec<Message>) -> Vec<ConversationSummary> {
    let mut groups: HashMap<_, ConversationSummary> = HashMap::new();

    for message in messages {
        let Some(other_user_id) = message.counterpart_of(user_id) else {
            continue;
        };
        let unread = u64::from(message.is_unread_for(user_id));

        match groups.entry(message.conversation_id.clone()) {
            Entry::Occupied(mut entry) => {
                let summary = entry.get_mut();
                summary.unread_count += unread;
                if recency(&message) > recency(&summary.last_message) {
                    summary.last_message = message;
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(ConversationSummary {
                    conversation_id: message.conversation_id.clone(),
                    other_user_id,
                    listing_id: message.listing_id,
                    unread_count: unread,
                    last_message: message,
                });
            }
        }
    }

    let mut summaries: Vec<_> = groups.into_values().collect();
    summaries.sort_by(|left, right| recency(&right.last_message).cmp(&recency(&left.last_message)));
    summaries
}

fn recency(message: &Message) -> (chrono::DateTime<chrono::Utc>, i64) {
    (message.created_at, message.id)
}
