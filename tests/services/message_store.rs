use actix_rt::test;
use chrono::{Duration, Utc};
use classifieds_messaging::application::MAX_MESSAGE_LENGTH;
use classifieds_messaging::domain::ConversationId;
use classifieds_messaging::error::AppError;
use uuid::Uuid;

use crate::common::fixtures::{stored_message, Messaging};

#[test]
async fn append_stores_unread_message_under_canonical_id() {
    let messaging = Messaging::new();
    let (buyer, seller) = (Uuid::new_v4(), Uuid::new_v4());
    let listing = messaging.listing(seller);

    let message = messaging
        .store
        .append(buyer, seller, listing, "Is this still available?")
        .await
        .expect("append should succeed");

    assert!(!message.is_read);
    assert_eq!(message.sender_id, buyer);
    assert_eq!(message.receiver_id, seller);
    assert_eq!(
        message.conversation_id,
        ConversationId::resolve(seller, buyer, listing).expect("distinct participants")
    );
    assert_eq!(messaging.message_repo.len(), 1);
}

#[test]
async fn append_rejects_blank_body_without_writing() {
    let messaging = Messaging::new();
    let (buyer, seller) = (Uuid::new_v4(), Uuid::new_v4());
    let listing = messaging.listing(seller);

    for body in ["", "   ", "\n\t"] {
        let result = messaging.store.append(buyer, seller, listing, body).await;
        assert!(matches!(result, Err(AppError::ValidationError { .. })));
    }
    assert_eq!(messaging.message_repo.len(), 0);
}

#[test]
async fn append_enforces_maximum_length() {
    let messaging = Messaging::new();
    let (buyer, seller) = (Uuid::new_v4(), Uuid::new_v4());
    let listing = messaging.listing(seller);

    let at_limit = "a".repeat(MAX_MESSAGE_LENGTH);
    let over_limit = "a".repeat(MAX_MESSAGE_LENGTH + 1);

    assert!(messaging
        .store
        .append(buyer, seller, listing, &at_limit)
        .await
        .is_ok());
    assert!(matches!(
        messaging.store.append(buyer, seller, listing, &over_limit).await,
        Err(AppError::ValidationError { .. })
    ));
}

#[test]
async fn append_rejects_messaging_yourself() {
    let messaging = Messaging::new();
    let seller = Uuid::new_v4();
    let listing = messaging.listing(seller);

    let result = messaging
        .store
        .append(seller, seller, listing, "hello me")
        .await;

    assert!(matches!(result, Err(AppError::ValidationError { .. })));
    assert_eq!(messaging.message_repo.len(), 0);
}

#[test]
async fn append_rejects_unknown_listing() {
    let messaging = Messaging::new();

    let result = messaging
        .store
        .append(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), "hello")
        .await;

    assert!(matches!(
        result,
        Err(AppError::ValidationError { message, .. }) if message == "listing does not exist"
    ));
}

#[test]
async fn list_by_conversation_is_ascending_with_id_tie_break() {
    let messaging = Messaging::new();
    let (buyer, seller) = (Uuid::new_v4(), Uuid::new_v4());
    let listing = messaging.listing(seller);
    let base = Utc::now();

    let later = base + Duration::seconds(5);
    let repo = &messaging.message_repo;
    repo.push(stored_message(3, buyer, seller, listing, "third", later));
    repo.push(stored_message(2, seller, buyer, listing, "second", base));
    repo.push(stored_message(1, buyer, seller, listing, "first", base));

    let conversation_id =
        ConversationId::resolve(buyer, seller, listing).expect("distinct participants");
    let messages = messaging
        .store
        .list_by_conversation(&conversation_id)
        .await
        .expect("list should succeed");

    let bodies: Vec<&str> = messages.iter().map(|m| m.body.as_str()).collect();
    assert_eq!(bodies, vec!["first", "second", "third"]);
    assert!(messages
        .windows(2)
        .all(|pair| pair[0].created_at <= pair[1].created_at));
}

#[test]
async fn store_outage_surfaces_as_transient_error() {
    let messaging = Messaging::new();
    let (buyer, seller) = (Uuid::new_v4(), Uuid::new_v4());
    let listing = messaging.listing(seller);
    messaging.message_repo.set_unavailable(true);

    let error = messaging
        .store
        .append(buyer, seller, listing, "hello")
        .await
        .expect_err("append should fail while the store is down");

    assert!(error.is_transient());
}
