use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::entity::EntityId;
use crate::event::{
    BoxError, Event, EventHandler, EventKind, EventRegistry, EventSystemError, PlayerChatEvent,
    PlayerJoinEvent, RecordingSink, sync_handler,
};

fn join_event(n: u128) -> Event {
    Event::PlayerJoin(PlayerJoinEvent { entity_id: EntityId::from_u128(n), name: format!("p{}", n) })
}

fn recorder(log: &Arc<Mutex<Vec<String>>>, label: &str) -> Arc<dyn EventHandler> {
    let log = log.clone();
    let label = label.to_string();
    sync_handler(move |_event: &Event| {
        log.lock().unwrap().push(label.clone());
        Ok(())
    })
}

#[tokio::test]
async fn test_handlers_run_in_registration_order() {
    let registry = EventRegistry::new();
    let log = Arc::new(Mutex::new(Vec::new()));

    registry.subscribe(EventKind::PlayerJoin, "a", recorder(&log, "first")).unwrap();
    registry.subscribe(EventKind::AnyPlayer, "b", recorder(&log, "second")).unwrap();
    registry.subscribe(EventKind::PlayerJoin, "a", recorder(&log, "third")).unwrap();

    let report = registry.publish(&join_event(1)).await.unwrap();

    assert_eq!(report.invoked, 3);
    assert!(report.is_clean());
    assert_eq!(*log.lock().unwrap(), vec!["first", "second", "third"]);
}

#[tokio::test]
async fn test_only_matching_kinds_are_invoked() {
    let registry = EventRegistry::new();
    let log = Arc::new(Mutex::new(Vec::new()));

    registry.subscribe(EventKind::PlayerQuit, "a", recorder(&log, "quit")).unwrap();
    registry.subscribe(EventKind::AnyHost, "a", recorder(&log, "host")).unwrap();
    registry.subscribe(EventKind::Any, "a", recorder(&log, "any")).unwrap();

    registry.publish(&join_event(1)).await.unwrap();
    registry.publish(&Event::HostStopping).await.unwrap();

    assert_eq!(*log.lock().unwrap(), vec!["any", "host", "any"]);
}

#[tokio::test]
async fn test_failing_handler_does_not_stop_dispatch() {
    let sink = Arc::new(RecordingSink::new());
    let registry = EventRegistry::with_sink(sink.clone());
    let counter = Arc::new(AtomicU32::new(0));

    let c1 = counter.clone();
    registry.subscribe(EventKind::PlayerJoin, "ok", sync_handler(move |_| {
        c1.fetch_add(1, Ordering::SeqCst);
        Ok(())
    })).unwrap();
    let failing = registry
        .subscribe(EventKind::PlayerJoin, "broken", sync_handler(|_| Err("boom".into())))
        .unwrap();
    let c2 = counter.clone();
    registry.subscribe(EventKind::PlayerJoin, "ok", sync_handler(move |_| {
        c2.fetch_add(1, Ordering::SeqCst);
        Ok(())
    })).unwrap();

    let report = registry.publish(&join_event(1)).await.unwrap();

    assert_eq!(counter.load(Ordering::SeqCst), 2);
    assert_eq!(report.invoked, 3);
    assert_eq!(report.failures.len(), 1);
    let failure = &report.failures[0];
    assert_eq!(failure.handle, failing);
    assert_eq!(failure.owner, "broken");
    assert_eq!(failure.event_name, "player.join");
    assert_eq!(failure.message, "boom");
    assert!(!failure.panicked);
    assert_eq!(sink.failures(), report.failures);
}

#[tokio::test]
async fn test_panicking_handler_is_isolated() {
    let sink = Arc::new(RecordingSink::new());
    let registry = EventRegistry::with_sink(sink.clone());
    let counter = Arc::new(AtomicU32::new(0));

    registry.subscribe(EventKind::PlayerJoin, "panicky", sync_handler(|_| panic!("kaboom"))).unwrap();
    let c = counter.clone();
    registry.subscribe(EventKind::PlayerJoin, "ok", sync_handler(move |_| {
        c.fetch_add(1, Ordering::SeqCst);
        Ok(())
    })).unwrap();

    let report = registry.publish(&join_event(1)).await.unwrap();

    assert_eq!(counter.load(Ordering::SeqCst), 1);
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].panicked);
    assert!(report.failures[0].message.contains("kaboom"));
    assert_eq!(sink.len(), 1);
}

#[tokio::test]
async fn test_unsubscribe_all_stops_future_dispatch() {
    let registry = EventRegistry::new();
    let log = Arc::new(Mutex::new(Vec::new()));

    registry.subscribe(EventKind::PlayerJoin, "chat", recorder(&log, "chat")).unwrap();
    registry.subscribe(EventKind::Any, "chat", recorder(&log, "chat-any")).unwrap();
    registry.subscribe(EventKind::PlayerJoin, "economy", recorder(&log, "economy")).unwrap();

    assert_eq!(registry.unsubscribe_all("chat"), 2);
    assert!(registry.subscriptions_of("chat").is_empty());

    registry.publish(&join_event(1)).await.unwrap();
    registry.publish(&join_event(2)).await.unwrap();

    assert_eq!(*log.lock().unwrap(), vec!["economy", "economy"]);
    assert_eq!(registry.unsubscribe_all("chat"), 0);
}

#[tokio::test]
async fn test_unsubscribe_single_handle() {
    let registry = EventRegistry::new();
    let log = Arc::new(Mutex::new(Vec::new()));

    let first = registry.subscribe(EventKind::PlayerJoin, "a", recorder(&log, "first")).unwrap();
    registry.subscribe(EventKind::PlayerJoin, "a", recorder(&log, "second")).unwrap();

    assert!(registry.unsubscribe(first));
    assert!(!registry.unsubscribe(first));
    registry.publish(&join_event(1)).await.unwrap();

    assert_eq!(*log.lock().unwrap(), vec!["second"]);
    assert_eq!(registry.subscription_count(), 1);
}

struct SubscribingHandler {
    registry: Arc<EventRegistry>,
    log: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl EventHandler for SubscribingHandler {
    async fn handle(&self, _event: &Event) -> Result<(), BoxError> {
        self.log.lock().unwrap().push("outer".to_string());
        self.registry.subscribe(EventKind::PlayerJoin, "late", recorder(&self.log, "late"))?;
        Ok(())
    }
}

#[tokio::test]
async fn test_subscription_added_mid_dispatch_is_not_observed() {
    let registry = Arc::new(EventRegistry::new());
    let log = Arc::new(Mutex::new(Vec::new()));

    registry
        .subscribe(EventKind::PlayerJoin, "outer", Arc::new(SubscribingHandler {
            registry: registry.clone(),
            log: log.clone(),
        }))
        .unwrap();

    let report = registry.publish(&join_event(1)).await.unwrap();
    assert_eq!(report.invoked, 1);
    assert_eq!(*log.lock().unwrap(), vec!["outer"]);

    // the late subscriber is fully present for the next dispatch
    registry.unsubscribe_all("outer");
    registry.publish(&join_event(2)).await.unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["outer", "late"]);
}

struct EchoChat {
    seen: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl EventHandler for EchoChat {
    async fn handle(&self, event: &Event) -> Result<(), BoxError> {
        if let Event::PlayerChat(chat) = event {
            tokio::task::yield_now().await;
            self.seen.lock().unwrap().push(chat.message.clone());
        }
        Ok(())
    }
}

#[tokio::test]
async fn test_async_handler() {
    let registry = EventRegistry::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    registry.subscribe(EventKind::PlayerChat, "chat", Arc::new(EchoChat { seen: seen.clone() })).unwrap();

    registry
        .publish(&Event::PlayerChat(PlayerChatEvent {
            entity_id: EntityId::from_u128(3),
            message: "hi all".into(),
        }))
        .await
        .unwrap();

    assert_eq!(*seen.lock().unwrap(), vec!["hi all"]);
}

#[tokio::test]
async fn test_teardown_closes_registry() {
    let registry = EventRegistry::new();
    let log = Arc::new(Mutex::new(Vec::new()));
    registry.subscribe(EventKind::Any, "a", recorder(&log, "a")).unwrap();

    registry.teardown();
    registry.teardown();

    assert!(!registry.is_live());
    assert_eq!(registry.subscription_count(), 0);
    assert_eq!(registry.publish(&join_event(1)).await.unwrap_err(), EventSystemError::RegistryClosed);
    assert_eq!(
        registry.subscribe(EventKind::Any, "a", recorder(&log, "a")).unwrap_err(),
        EventSystemError::RegistryClosed
    );
    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_held_dispatch_invokes_no_handler() {
    let registry = EventRegistry::new();
    let log = Arc::new(Mutex::new(Vec::new()));
    registry.hold_dispatch();
    assert!(!registry.is_dispatching());

    // Subscribing is still fine while held
    registry.subscribe(EventKind::Any, "a", recorder(&log, "a")).unwrap();
    assert_eq!(registry.publish(&join_event(1)).await.unwrap_err(), EventSystemError::DispatchHeld);
    assert!(log.lock().unwrap().is_empty());

    registry.open_dispatch();
    assert!(registry.is_dispatching());
    assert_eq!(registry.publish(&join_event(1)).await.unwrap().invoked, 1);
    assert_eq!(*log.lock().unwrap(), vec!["a"]);
}

#[tokio::test]
async fn test_empty_owner_is_rejected() {
    let registry = EventRegistry::new();
    let result = registry.subscribe(EventKind::Any, "", sync_handler(|_| Ok(())));
    assert_eq!(result.unwrap_err(), EventSystemError::InvalidOwner);
}

#[tokio::test]
async fn test_concurrent_publish_from_tasks() {
    let registry = Arc::new(EventRegistry::new());
    let counter = Arc::new(AtomicU32::new(0));
    let c = counter.clone();
    registry.subscribe(EventKind::PlayerJoin, "count", sync_handler(move |_| {
        c.fetch_add(1, Ordering::SeqCst);
        Ok(())
    })).unwrap();

    let mut tasks = Vec::new();
    for n in 0..8u128 {
        let registry = registry.clone();
        tasks.push(tokio::spawn(async move { registry.publish(&join_event(n)).await }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    assert_eq!(counter.load(Ordering::SeqCst), 8);
}
