use std::collections::{HashMap, HashSet};

use actix_rt::test;
use chrono::{Duration, Utc};
use classifieds_messaging::application::{summarize, ConversationAggregator};
use classifieds_messaging::domain::ConversationId;
use uuid::Uuid;

use crate::common::fixtures::{stored_message, Messaging};

#[test]
async fn unread_counts_follow_direction_of_messages() {
    let messaging = Messaging::new();
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    let listing = messaging.listing(b);
    let (n, m) = (4, 3);

    for index in 0..n {
        messaging
            .store
            .append(a, b, listing, &format!("a to b {index}"))
            .await
            .expect("append should succeed");
    }
    for index in 0..m {
        messaging
            .store
            .append(b, a, listing, &format!("b to a {index}"))
            .await
            .expect("append should succeed");
    }

    let aggregator = ConversationAggregator::new(messaging.store.clone());
    let for_b = aggregator
        .conversations_for(b)
        .await
        .expect("aggregation should succeed");
    let for_a = aggregator
        .conversations_for(a)
        .await
        .expect("aggregation should succeed");

    assert_eq!(for_b.len(), 1);
    assert_eq!(for_b[0].unread_count, n);
    assert_eq!(for_b[0].other_user_id, a);
    assert_eq!(for_a[0].unread_count, m);
    assert_eq!(for_a[0].other_user_id, b);
}

#[test]
async fn user_without_messages_has_empty_inbox() {
    let messaging = Messaging::new();
    let aggregator = ConversationAggregator::new(messaging.store.clone());

    let summaries = aggregator
        .conversations_for(Uuid::new_v4())
        .await
        .expect("aggregation should succeed");

    assert!(summaries.is_empty());
}

#[test]
async fn sender_only_conversation_has_no_unread_and_known_counterpart() {
    let (sender, receiver, listing) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    let messages = vec![stored_message(
        1,
        sender,
        receiver,
        listing,
        "anyone?",
        Utc::now(),
    )];

    let summaries = summarize(sender, messages);

    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].unread_count, 0);
    assert_eq!(summaries[0].other_user_id, receiver);
}

#[test]
async fn last_message_is_latest_regardless_of_input_order() {
    let (me, other, listing) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    let base = Utc::now();
    let messages = vec![
        stored_message(2, other, me, listing, "newest", base + Duration::minutes(10)),
        stored_message(1, me, other, listing, "oldest", base),
        stored_message(3, me, other, listing, "middle", base + Duration::minutes(5)),
    ];

    let summaries = summarize(me, messages);

    assert_eq!(summaries[0].last_message.body, "newest");
}

#[test]
async fn inbox_is_ordered_by_most_recent_activity() {
    let me = Uuid::new_v4();
    let base = Utc::now();
    let (quiet, busy) = (Uuid::new_v4(), Uuid::new_v4());
    let (quiet_listing, busy_listing) = (Uuid::new_v4(), Uuid::new_v4());
    let messages = vec![
        stored_message(1, quiet, me, quiet_listing, "old", base),
        stored_message(2, busy, me, busy_listing, "recent", base + Duration::hours(1)),
    ];

    let summaries = summarize(me, messages);

    let order: Vec<Uuid> = summaries.iter().map(|s| s.other_user_id).collect();
    assert_eq!(order, vec![busy, quiet]);
}

#[test]
async fn every_group_has_two_participants_and_one_listing() {
    let messaging = Messaging::new();
    let users: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
    let listings: Vec<Uuid> = users.iter().map(|owner| messaging.listing(*owner)).collect();

    for (index, sender) in users.iter().enumerate() {
        for (offset, receiver) in users.iter().enumerate() {
            if sender == receiver {
                continue;
            }
            let listing = listings[(index + offset) % listings.len()];
            messaging
                .store
                .append(*sender, *receiver, listing, "ping")
                .await
                .expect("append should succeed");
        }
    }

    let mut groups: HashMap<ConversationId, (HashSet<Uuid>, HashSet<Uuid>)> = HashMap::new();
    for message in messaging.message_repo.all() {
        let (participants, listings) = groups.entry(message.conversation_id.clone()).or_default();
        participants.insert(message.sender_id);
        participants.insert(message.receiver_id);
        listings.insert(message.listing_id);
    }

    assert!(!groups.is_empty());
    for (conversation_id, (participants, listing_ids)) in groups {
        assert_eq!(participants.len(), 2, "{conversation_id}");
        assert_eq!(listing_ids.len(), 1, "{conversation_id}");
        assert!(listing_ids.contains(&conversation_id.listing_id()));
    }
}
