use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{DomainError, Message};

/// Joins the ordered participant ids and the listing id. A hyphenated UUID
/// never contains it, so distinct tuples cannot render to the same key.
pub const CONVERSATION_ID_SEPARATOR: char = '_';

/// Stable key for one unordered pair of users talking about one listing.
///
/// Rendered as `"{low}_{high}_{listing}"` where `low < high` compares the
/// lowercase hyphenated forms, so both participants derive the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ConversationId {
    raw: String,
    low: Uuid,
    high: Uuid,
    listing_id: Uuid,
}

impl ConversationId {
    pub fn resolve(a: Uuid, b: Uuid, listing_id: Uuid) -> Result<Self, DomainError> {
        if a == b {
            return Err(DomainError::ValidationError(
                "cannot start a conversation with yourself".to_string(),
            ));
        }

        let (low, high) = if a.to_string() < b.to_string() {
            (a, b)
        } else {
            (b, a)
        };

        Ok(Self {
            raw: format!(
                "{low}{sep}{high}{sep}{listing_id}",
                sep = CONVERSATION_ID_SEPARATOR
            ),
            low,
            high,
            listing_id,
        })
    }

    /// Accepts only the canonical rendering produced by [`ConversationId::resolve`].
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let segments: Vec<&str> = raw.split(CONVERSATION_ID_SEPARATOR).collect();
        let [first, second, listing] = segments.as_slice() else {
            return Err(malformed(raw));
        };

        let first = parse_segment(raw, first)?;
        let second = parse_segment(raw, second)?;
        let listing_id = parse_segment(raw, listing)?;

        let resolved = Self::resolve(first, second, listing_id).map_err(|_| malformed(raw))?;
        if resolved.raw != raw {
            return Err(malformed(raw));
        }
        Ok(resolved)
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn participants(&self) -> (Uuid, Uuid) {
        (self.low, self.high)
    }

    pub fn listing_id(&self) -> Uuid {
        self.listing_id
    }

    pub fn has_participant(&self, user_id: Uuid) -> bool {
        self.low == user_id || self.high == user_id
    }

    pub fn other_participant(&self, user_id: Uuid) -> Option<Uuid> {
        if self.low == user_id {
            Some(self.high)
        } else if self.high == user_id {
            Some(self.low)
        } else {
            None
        }
    }
}

fn parse_segment(raw: &str, segment: &str) -> Result<Uuid, DomainError> {
    Uuid::parse_str(segment).map_err(|_| malformed(raw))
}

fn malformed(raw: &str) -> DomainError {
    DomainError::ValidationError(format!("malformed conversation id: {raw}"))
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl TryFrom<String> for ConversationId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ConversationId> for String {
    fn from(value: ConversationId) -> Self {
        value.raw
    }
}

/// One inbox row derived from the message log; never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationSummary {
    pub conversation_id: ConversationId,
    pub other_user_id: Uuid,
    pub listing_id: Uuid,
    pub last_message: Message,
    pub unread_count: u64,
}
