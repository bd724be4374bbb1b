//! Consumer-side access to the messaging API and the polling loop that keeps
//! an open conversation approximately live.
mod api;
mod sync;

pub use api::{HttpMessagingApi, MessagingApi};
pub use sync::{MessagesView, SyncClient, SyncState};
