pub mod conversation;
pub mod errors;
pub mod listing;
pub mod message;

pub use conversation::{ConversationId, ConversationSummary, CONVERSATION_ID_SEPARATOR};
pub use errors::DomainError;
pub use listing::Listing;
pub use message::{Message, NewMessage};
