use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::{ConversationId, ConversationSummary, Listing, Message};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveConversationRequest {
    pub other_user_id: Uuid,
    pub listing_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolveConversationResponse {
    pub conversation_id: ConversationId,
}

/// Either `conversation_id`, or both `receiver_id` and `listing_id`, must be set.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct SendMessageRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listing_id: Option<Uuid>,
    #[validate(length(
        min = 1,
        max = 5000,
        message = "message body must be between 1 and 5000 characters"
    ))]
    pub body: String,
}

impl SendMessageRequest {
    pub fn in_conversation(conversation_id: &ConversationId, body: impl Into<String>) -> Self {
        Self {
            conversation_id: Some(conversation_id.to_string()),
            body: body.into(),
            ..Default::default()
        }
    }

    pub fn to_listing(receiver_id: Uuid, listing_id: Uuid, body: impl Into<String>) -> Self {
        Self {
            receiver_id: Some(receiver_id),
            listing_id: Some(listing_id),
            body: body.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub id: i64,
    pub conversation_id: ConversationId,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub listing_id: Uuid,
    pub body: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self {
            id: message.id,
            conversation_id: message.conversation_id,
            sender_id: message.sender_id,
            receiver_id: message.receiver_id,
            listing_id: message.listing_id,
            body: message.body,
            is_read: message.is_read,
            created_at: message.created_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewerRole {
    Owner,
    Buyer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingPreview {
    pub id: Uuid,
    pub title: String,
    pub thumbnail_url: Option<String>,
}

impl From<&Listing> for ListingPreview {
    fn from(listing: &Listing) -> Self {
        Self {
            id: listing.id,
            title: listing.title.clone(),
            thumbnail_url: listing.thumbnail_url.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSummaryResponse {
    pub conversation_id: ConversationId,
    pub other_user_id: Uuid,
    pub listing_id: Uuid,
    pub listing: Option<ListingPreview>,
    pub viewer_role: ViewerRole,
    pub last_message: MessageResponse,
    pub unread_count: u64,
}

impl ConversationSummaryResponse {
    /// `listing` is display-only; `None` when the listing has since gone away.
    pub fn from_summary(
        summary: ConversationSummary,
        viewer_id: Uuid,
        listing: Option<&Listing>,
    ) -> Self {
        let viewer_role = match listing {
            Some(listing) if listing.is_owned_by(viewer_id) => ViewerRole::Owner,
            _ => ViewerRole::Buyer,
        };

        Self {
            conversation_id: summary.conversation_id,
            other_user_id: summary.other_user_id,
            listing_id: summary.listing_id,
            listing: listing.map(ListingPreview::from),
            viewer_role,
            last_message: summary.last_message.into(),
            unread_count: summary.unread_count,
        }
    }
}
