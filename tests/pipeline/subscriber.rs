//! EventSubscriber wired to the in-memory bus.

use std::sync::Arc;
use std::time::{Duration, Instant};

use statistics_service::bus::{InMemoryQueue, Message, Publisher};
use statistics_service::wire::{InventoryEventType, OrderStatusCode};
use statistics_service::{
    EventStore, EventSubscriber, FileEventStore, InMemoryEventStore, StatisticsEngine,
    SubscriberConfig, SubscriptionState, SubscriptionStats,
};

use crate::support::{at_hour, inventory_message, order_message, RefusingStore};

fn fast_config() -> SubscriberConfig {
    SubscriberConfig {
        workers_per_topic: 3,
        poll_interval: Duration::from_millis(5),
        ..Default::default()
    }
}

fn wait_for<B, S>(subscriber: &EventSubscriber<B, S>, done: impl Fn(&SubscriptionStats) -> bool)
where
    B: statistics_service::bus::Subscribable,
    S: EventStore + Clone + 'static,
{
    let deadline = Instant::now() + Duration::from_secs(5);
    while !done(&subscriber.stats()) && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn mixed_traffic_is_routed_and_counted() {
    let queue = InMemoryQueue::new();
    let store = InMemoryEventStore::new();
    let mut subscriber = EventSubscriber::new(queue.clone(), store.clone(), fast_config());
    subscriber.start().unwrap();
    assert_eq!(subscriber.state(), SubscriptionState::Subscribed);

    queue
        .publish_batch(vec![
            order_message("e-1", "u1", OrderStatusCode::Completed, 9, &[("p1", 1, 4.0)]),
            order_message("e-2", "u1", OrderStatusCode::Cancelled, 9, &[]),
            inventory_message("e-3", InventoryEventType::Created, 10.0, 5, Some(at_hour(9))),
            inventory_message("e-4", InventoryEventType::Created, 0.0, 5, Some(at_hour(9))),
            Message::new("m-5", "order.events", vec![0x0a, 0xff, 0xff]),
            // Matches neither pattern.
            Message::new("m-6", "payment.events", vec![]),
        ])
        .unwrap();

    wait_for(&subscriber, |s| s.received >= 5);
    let stats = subscriber.stop().unwrap();

    assert_eq!(subscriber.state(), SubscriptionState::Unsubscribed);
    assert_eq!(stats.received, 5);
    assert_eq!(stats.stored, 3);
    assert_eq!(stats.validation_failures, 1);
    assert_eq!(stats.decode_failures, 1);
    assert_eq!(stats.store_failures, 0);

    assert_eq!(store.order_event_count().unwrap(), 2);
    assert_eq!(store.inventory_event_count().unwrap(), 1);
}

#[test]
fn every_message_is_handled_once_by_competing_workers() {
    let queue = InMemoryQueue::new();
    let store = InMemoryEventStore::new();
    let mut subscriber = EventSubscriber::new(queue.clone(), store.clone(), fast_config());
    subscriber.start().unwrap();

    let publisher = {
        let queue = queue.clone();
        std::thread::spawn(move || {
            for i in 0..100 {
                let hour = i % 24;
                let message =
                    order_message(&format!("e-{i}"), "u1", OrderStatusCode::Completed, hour, &[]);
                queue.publish(message).unwrap();
            }
        })
    };
    publisher.join().unwrap();

    wait_for(&subscriber, |s| s.stored >= 100);
    let stats = subscriber.stop().unwrap();
    assert_eq!(stats.received, 100);
    assert_eq!(stats.stored, 100);

    let mut ids: Vec<String> = store
        .find_by_user("u1")
        .unwrap()
        .into_iter()
        .map(|e| e.event_id)
        .collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 100);

    let stats = StatisticsEngine::new(store)
        .compute_user_statistics("u1")
        .unwrap();
    assert_eq!(stats.total_orders, 100);
    assert_eq!(stats.hourly_distribution.values().sum::<u64>(), 100);
}

#[test]
fn custom_patterns_narrow_the_subscription() {
    let queue = InMemoryQueue::new();
    let store = InMemoryEventStore::new();
    let config = SubscriberConfig {
        order_pattern: "order.events".into(),
        inventory_pattern: "inventory.events".into(),
        ..fast_config()
    };
    let mut subscriber = EventSubscriber::new(queue.clone(), store.clone(), config);
    subscriber.start().unwrap();

    let mut elsewhere = order_message("e-2", "u1", OrderStatusCode::Pending, 1, &[]);
    elsewhere.topic = "order.audit".into();
    queue.publish(elsewhere).unwrap();
    queue
        .publish(order_message("e-1", "u1", OrderStatusCode::Pending, 1, &[]))
        .unwrap();

    wait_for(&subscriber, |s| s.stored >= 1);
    // Give a stray delivery of the audit message time to show up.
    std::thread::sleep(Duration::from_millis(50));
    let stats = subscriber.stop().unwrap();

    assert_eq!(stats.received, 1);
    let events = store.find_by_user("u1").unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_id, "e-1");
}

#[test]
fn subscriber_writes_through_to_the_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileEventStore::open(dir.path()).unwrap());
    let queue = InMemoryQueue::new();
    let mut subscriber = EventSubscriber::new(queue.clone(), Arc::clone(&store), fast_config());
    subscriber.start().unwrap();

    for i in 0..10 {
        queue
            .publish(order_message(
                &format!("e-{i}"),
                "u1",
                OrderStatusCode::Completed,
                8,
                &[("p1", 1, 2.5)],
            ))
            .unwrap();
    }
    wait_for(&subscriber, |s| s.stored >= 10);
    subscriber.stop().unwrap();
    drop(subscriber);
    drop(store);

    let reopened = FileEventStore::open(dir.path()).unwrap();
    let stats = StatisticsEngine::new(reopened)
        .compute_user_statistics("u1")
        .unwrap();
    assert_eq!(stats.total_orders, 10);
    assert_eq!(stats.total_items_purchased, 10);
    assert_eq!(stats.most_purchased_item.as_deref(), Some("p1"));
    assert_eq!(stats.average_order_value, 2.5);
}

#[test]
fn failed_writes_are_counted_and_ingestion_continues() {
    let queue = InMemoryQueue::new();
    let store = RefusingStore::refusing("u1");
    let config = SubscriberConfig {
        workers_per_topic: 1,
        ..fast_config()
    };
    let mut subscriber = EventSubscriber::new(queue.clone(), store.clone(), config);
    subscriber.start().unwrap();

    queue
        .publish_batch(vec![
            order_message("e-1", "u1", OrderStatusCode::Completed, 9, &[]),
            order_message("e-2", "u1", OrderStatusCode::Completed, 10, &[]),
            order_message("e-3", "u2", OrderStatusCode::Completed, 11, &[]),
        ])
        .unwrap();

    wait_for(&subscriber, |s| s.received >= 3);
    let stats = subscriber.stop().unwrap();

    assert_eq!(stats.received, 3);
    assert_eq!(stats.store_failures, 2);
    assert_eq!(stats.stored, 1);
    assert!(store.find_by_user("u1").unwrap().is_empty());
    let stored = store.find_by_user("u2").unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].event_id, "e-3");
}
