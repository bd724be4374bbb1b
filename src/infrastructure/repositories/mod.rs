mod listing_repository;
mod message_repository;
mod traits;

pub use listing_repository::ListingRepositoryImpl;
pub use message_repository::MessageRepositoryImpl;
pub use traits::{ListingRepository, MessageRepository};
