mod aggregator;
mod message_service;
mod message_store;
mod read_state;

pub use aggregator::{summarize, ConversationAggregator};
pub use message_service::MessageService;
pub use message_store::{MessageStore, MAX_MESSAGE_LENGTH};
pub use read_state::ReadStateSynchronizer;
