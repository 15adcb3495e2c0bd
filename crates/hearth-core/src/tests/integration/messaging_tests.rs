#![cfg(test)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::entity::{AddressableEntity, EntityId, Message, Style, TextComponent};
use crate::event::{BoxError, Event, EventHandler, EventKind, EventSystemError, PlayerJoinEvent};
use crate::kernel::Host;
use crate::plugin_system::{Plugin, PluginContext, PluginDescriptor, PluginError};

// ===== MOCK PLUGINS =====

/// Welcomes every joining player through the entity directory
struct Greeter {
    joins: Arc<AtomicUsize>,
}

struct WelcomeHandler {
    ctx: PluginContext,
    joins: Arc<AtomicUsize>,
}

#[async_trait]
impl EventHandler for WelcomeHandler {
    async fn handle(&self, event: &Event) -> Result<(), BoxError> {
        if let Event::PlayerJoin(join) = event {
            self.joins.fetch_add(1, Ordering::SeqCst);
            let player = self.ctx.lookup_entity(join.entity_id)?;
            let style = Style::new().with("color", "gold");
            player.send_message(Message::Structured(TextComponent::styled(
                format!("Welcome, {}!", join.name),
                style,
            )))?;
        }
        Ok(())
    }
}

#[async_trait]
impl Plugin for Greeter {
    async fn setup(&mut self, ctx: &PluginContext) -> Result<(), PluginError> {
        let handler = WelcomeHandler {
            ctx: ctx.clone(),
            joins: self.joins.clone(),
        };
        ctx.events().subscribe(EventKind::PlayerJoin, Arc::new(handler))?;
        Ok(())
    }
}

/// Credits a starting balance to each joining player
struct Ledger {
    balances: Arc<Mutex<HashMap<EntityId, u64>>>,
}

#[async_trait]
impl Plugin for Ledger {
    async fn setup(&mut self, ctx: &PluginContext) -> Result<(), PluginError> {
        let start: u64 = ctx.setting("starting_balance")?.unwrap_or(100);
        let balances = self.balances.clone();
        ctx.events().on(EventKind::PlayerJoin, move |event| {
            if let Event::PlayerJoin(PlayerJoinEvent { entity_id, .. }) = event {
                balances.lock().unwrap().insert(*entity_id, start);
            }
            Ok(())
        })?;
        Ok(())
    }
}

#[tokio::test]
async fn test_join_handler_runs_once_and_never_after_shutdown() {
    let joins = Arc::new(AtomicUsize::new(0));
    let balances: Arc<Mutex<HashMap<EntityId, u64>>> = Arc::default();

    let j = joins.clone();
    let greeter = PluginDescriptor::new("greeter", move |_ctx: &PluginContext| {
        Ok(Box::new(Greeter { joins: j }) as Box<dyn Plugin>)
    });
    let b = balances.clone();
    let ledger = PluginDescriptor::new("ledger", move |_ctx: &PluginContext| {
        Ok(Box::new(Ledger { balances: b }) as Box<dyn Plugin>)
    })
    .with_settings(serde_json::json!({ "starting_balance": 250 }));

    let mut host = Host::new().unwrap();
    host.load_all(vec![greeter, ledger]).unwrap();
    host.run_setup_phase().await.unwrap();
    host.run_start_phase().await.unwrap();

    let (alex, mut rx) = host.connect("Alex").await.unwrap();
    assert_eq!(joins.load(Ordering::SeqCst), 1);
    assert_eq!(balances.lock().unwrap().get(&alex.id()), Some(&250));

    let welcome = rx.try_recv().expect("welcome message");
    assert_eq!(
        welcome,
        br#"{"text":"Welcome, Alex!","style":{"color":"gold"}}"#.to_vec()
    );

    let events = host.events().clone();
    host.shutdown_all().await.unwrap();

    let late = Event::from(PlayerJoinEvent {
        entity_id: alex.id(),
        name: "Alex".to_string(),
    });
    assert_eq!(events.publish(&late).await.unwrap_err(), EventSystemError::RegistryClosed);
    assert_eq!(joins.load(Ordering::SeqCst), 1);
    assert!(host.handler_failures().is_empty());
}

#[tokio::test]
async fn test_plain_and_structured_sends_are_identical() {
    let mut host = Host::new().unwrap();
    host.run_setup_phase().await.unwrap();
    host.run_start_phase().await.unwrap();
    let (alex, mut rx) = host.connect("Alex").await.unwrap();

    alex.send_text("hello").unwrap();
    alex.send_message(Message::Structured(TextComponent::plain("hello")))
        .unwrap();
    // An explicitly empty style is still a single unstyled segment
    alex.send_message(Message::Structured(TextComponent {
        text: "hello".to_string(),
        style: Some(Style::new()),
        extra: Vec::new(),
    }))
    .unwrap();
    let decoded: TextComponent = serde_json::from_str(r#"{"text":"hello","style":{}}"#).unwrap();
    alex.send_message(decoded.into()).unwrap();

    let payloads = rx.drain();
    assert_eq!(payloads.len(), 4);
    assert!(payloads.iter().all(|p| p == &payloads[0]));
    assert_eq!(payloads[0], br#"{"text":"hello"}"#.to_vec());
}

#[tokio::test]
async fn test_welcome_to_departed_player_is_reported_not_fatal() {
    let joins = Arc::new(AtomicUsize::new(0));
    let j = joins.clone();
    let greeter = PluginDescriptor::new("greeter", move |_ctx: &PluginContext| {
        Ok(Box::new(Greeter { joins: j }) as Box<dyn Plugin>)
    });

    let mut host = Host::new().unwrap();
    host.load_all(vec![greeter]).unwrap();
    host.run_setup_phase().await.unwrap();
    host.run_start_phase().await.unwrap();

    // Joined player whose receiver is already gone
    let (ghost, rx) = host.connect("Ghost").await.unwrap();
    drop(rx);
    let replay = Event::from(PlayerJoinEvent {
        entity_id: ghost.id(),
        name: "Ghost".to_string(),
    });
    let report = host.publish(&replay).await.unwrap();

    assert_eq!(report.invoked, 1);
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].message.contains("no live session"));
    assert_eq!(host.handler_failures().len(), 1);
    assert_eq!(joins.load(Ordering::SeqCst), 2);
}
