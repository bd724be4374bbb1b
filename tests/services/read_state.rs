use std::sync::{Arc, Mutex};

use actix_rt::test;
use async_trait::async_trait;
use classifieds_messaging::application::{
    summarize, MessageStore, ReadStateSynchronizer,
};
use classifieds_messaging::domain::{ConversationId, Message, NewMessage};
use classifieds_messaging::error::{AppError, AppResult};
use classifieds_messaging::infrastructure::repositories::MessageRepository;
use uuid::Uuid;

use crate::common::fixtures::Messaging;
use crate::common::mocks::{MockListingRepo, MockMessageRepo};

fn unread_for(messages: Vec<Message>, user_id: Uuid) -> u64 {
    summarize(user_id, messages)
        .iter()
        .map(|summary| summary.unread_count)
        .sum()
}

#[test]
async fn open_marks_only_messages_addressed_to_viewer() {
    let messaging = Messaging::new();
    let (buyer, seller) = (Uuid::new_v4(), Uuid::new_v4());
    let listing = messaging.listing(seller);

    let to_seller = messaging
        .store
        .append(buyer, seller, listing, "Is this still available?")
        .await
        .expect("append should succeed");
    messaging
        .store
        .append(seller, buyer, listing, "Yes it is")
        .await
        .expect("append should succeed");

    let read_state = ReadStateSynchronizer::new(messaging.store.clone());
    read_state
        .open_conversation(&to_seller.conversation_id, seller)
        .await
        .expect("open should succeed");

    for message in messaging.message_repo.all() {
        if message.receiver_id == seller {
            assert!(message.is_read, "seller's inbound message should be read");
        } else {
            assert!(!message.is_read, "seller's outbound message must stay unread");
        }
    }
}

#[test]
async fn open_returns_snapshot_taken_before_marking() {
    let messaging = Messaging::new();
    let (buyer, seller) = (Uuid::new_v4(), Uuid::new_v4());
    let listing = messaging.listing(seller);
    let sent = messaging
        .store
        .append(buyer, seller, listing, "hello")
        .await
        .expect("append should succeed");

    let read_state = ReadStateSynchronizer::new(messaging.store.clone());
    let snapshot = read_state
        .open_conversation(&sent.conversation_id, seller)
        .await
        .expect("open should succeed");

    assert_eq!(snapshot.len(), 1);
    assert!(!snapshot[0].is_read);
    assert!(messaging.message_repo.all()[0].is_read);
}

#[test]
async fn second_open_changes_nothing() {
    let messaging = Messaging::new();
    let (buyer, seller) = (Uuid::new_v4(), Uuid::new_v4());
    let listing = messaging.listing(seller);
    for body in ["one", "two"] {
        messaging
            .store
            .append(buyer, seller, listing, body)
            .await
            .expect("append should succeed");
    }
    let conversation_id =
        ConversationId::resolve(buyer, seller, listing).expect("distinct participants");
    let read_state = ReadStateSynchronizer::new(messaging.store.clone());

    let first = read_state
        .open_conversation(&conversation_id, seller)
        .await
        .expect("first open should succeed");
    let after_first = messaging.message_repo.all();
    let second = read_state
        .open_conversation(&conversation_id, seller)
        .await
        .expect("second open should succeed");

    assert_eq!(unread_for(messaging.message_repo.all(), seller), 0);
    assert_eq!(messaging.message_repo.all(), after_first);
    assert_eq!(
        messaging
            .store
            .mark_read(&conversation_id, seller)
            .await
            .expect("mark read should succeed"),
        0
    );
    assert_eq!(first.len(), second.len());
    assert!(second.iter().all(|message| message.is_read));
}

#[test]
async fn non_participant_cannot_open_or_peek() {
    let messaging = Messaging::new();
    let (buyer, seller, outsider) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    let listing = messaging.listing(seller);
    let sent = messaging
        .store
        .append(buyer, seller, listing, "hello")
        .await
        .expect("append should succeed");
    let read_state = ReadStateSynchronizer::new(messaging.store.clone());

    assert!(matches!(
        read_state
            .open_conversation(&sent.conversation_id, outsider)
            .await,
        Err(AppError::Forbidden(_))
    ));
    assert!(matches!(
        read_state
            .peek_conversation(&sent.conversation_id, outsider)
            .await,
        Err(AppError::Forbidden(_))
    ));
    assert!(!messaging.message_repo.all()[0].is_read);
}

#[test]
async fn opening_a_conversation_with_no_messages_yields_empty_list() {
    let messaging = Messaging::new();
    let (buyer, seller) = (Uuid::new_v4(), Uuid::new_v4());
    let listing = messaging.listing(seller);
    let conversation_id =
        ConversationId::resolve(buyer, seller, listing).expect("distinct participants");
    let read_state = ReadStateSynchronizer::new(messaging.store.clone());

    let messages = read_state
        .open_conversation(&conversation_id, buyer)
        .await
        .expect("open should succeed");

    assert!(messages.is_empty());
}

#[test]
async fn peek_leaves_read_state_untouched() {
    let messaging = Messaging::new();
    let (buyer, seller) = (Uuid::new_v4(), Uuid::new_v4());
    let listing = messaging.listing(seller);
    let sent = messaging
        .store
        .append(buyer, seller, listing, "hello")
        .await
        .expect("append should succeed");
    let read_state = ReadStateSynchronizer::new(messaging.store.clone());

    let messages = read_state
        .peek_conversation(&sent.conversation_id, seller)
        .await
        .expect("peek should succeed");

    assert_eq!(messages.len(), 1);
    assert_eq!(unread_for(messaging.message_repo.all(), seller), 1);
}

/// Lands a pending message between the viewer's fetch and mark-read.
struct InterleavingRepo {
    inner: Arc<MockMessageRepo>,
    pending: Mutex<Option<NewMessage>>,
}

#[async_trait]
impl MessageRepository for InterleavingRepo {
    async fn insert(&self, message: &NewMessage) -> AppResult<Message> {
        self.inner.insert(message).await
    }

    async fn find_by_conversation(
        &self,
        conversation_id: &ConversationId,
    ) -> AppResult<Vec<Message>> {
        self.inner.find_by_conversation(conversation_id).await
    }

    async fn find_by_participant(&self, user_id: Uuid) -> AppResult<Vec<Message>> {
        self.inner.find_by_participant(user_id).await
    }

    async fn mark_read(
        &self,
        conversation_id: &ConversationId,
        receiver_id: Uuid,
    ) -> AppResult<u64> {
        let pending = self.pending.lock().expect("pending mutex poisoned").take();
        if let Some(message) = pending {
            self.inner.insert(&message).await?;
        }
        self.inner.mark_read(conversation_id, receiver_id).await
    }
}

#[test]
async fn message_sent_between_fetch_and_mark_is_marked_but_not_returned() {
    let (buyer, seller) = (Uuid::new_v4(), Uuid::new_v4());
    let listing_repo = Arc::new(MockListingRepo::default());
    let listing = crate::common::fixtures::listing_owned_by(seller);
    let listing_id = listing.id;
    listing_repo.push(listing);

    let inner = Arc::new(MockMessageRepo::default());
    let conversation_id =
        ConversationId::resolve(buyer, seller, listing_id).expect("distinct participants");
    let repo = Arc::new(InterleavingRepo {
        inner: inner.clone(),
        pending: Mutex::new(Some(NewMessage {
            conversation_id: conversation_id.clone(),
            sender_id: buyer,
            receiver_id: seller,
            listing_id,
            body: "are you there?".to_string(),
        })),
    });
    let store = MessageStore::new(repo, listing_repo);
    store
        .append(buyer, seller, listing_id, "hello")
        .await
        .expect("append should succeed");

    let snapshot = ReadStateSynchronizer::new(store)
        .open_conversation(&conversation_id, seller)
        .await
        .expect("open should succeed");

    let stored = inner.all();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(stored.len(), 2);
    assert!(
        stored.iter().all(|message| message.is_read),
        "the late message falls inside the accepted staleness window"
    );
}

#[test]
async fn concurrent_mark_read_calls_commute() {
    let messaging = Messaging::new();
    let (buyer, seller) = (Uuid::new_v4(), Uuid::new_v4());
    let listing = messaging.listing(seller);
    for index in 0..5 {
        messaging
            .store
            .append(buyer, seller, listing, &format!("message {index}"))
            .await
            .expect("append should succeed");
    }
    let conversation_id =
        ConversationId::resolve(buyer, seller, listing).expect("distinct participants");

    let (left, right) = tokio::join!(
        messaging.store.mark_read(&conversation_id, seller),
        messaging.store.mark_read(&conversation_id, seller)
    );

    let updated = left.expect("mark read should succeed") + right.expect("mark read should succeed");
    assert_eq!(updated, 5);
    assert_eq!(unread_for(messaging.message_repo.all(), seller), 0);
}
