//! Chat plugin for the Hearth host.
//!
//! Greets every joining player with a styled welcome line, relays chat lines
//! to everyone online and announces departures.
//!
//! Settings (all optional):
//!
//! ```json
//! { "greeting": "Welcome, {name}!", "color": "gold", "announce_quits": true }
//! ```
use std::sync::Arc;

use async_trait::async_trait;
use hearth_core::entity::{AddressableEntity, EntityDirectory, EntityId, Message, Style, TextComponent};
use hearth_core::event::{BoxError, Event, EventHandler, EventKind, SubscriptionHandle};
use hearth_core::plugin_system::{Plugin, PluginContext, PluginDescriptor, PluginError};
use serde::Deserialize;
use serde_json::Value;

pub const PLUGIN_ID: &str = "chat";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChatSettings {
    /// `{name}` is replaced with the player's display name
    pub greeting: String,
    pub color: String,
    pub announce_quits: bool,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            greeting: "Welcome, {name}!".to_string(),
            color: "gold".to_string(),
            announce_quits: true,
        }
    }
}

impl ChatSettings {
    fn from_value(settings: &Value) -> Result<Self, PluginError> {
        if settings.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(settings.clone())
            .map_err(|e| PluginError::ConfigError(format!("invalid chat settings: {}", e)))
    }

    pub fn welcome_for(&self, name: &str) -> String {
        self.greeting.replace("{name}", name)
    }
}

/// Descriptor with default settings
pub fn descriptor() -> PluginDescriptor {
    descriptor_with(Value::Null)
}

pub fn descriptor_with(settings: Value) -> PluginDescriptor {
    PluginDescriptor::new(PLUGIN_ID, |ctx: &PluginContext| {
        let settings = ChatSettings::from_value(ctx.settings())?;
        Ok(Box::new(ChatPlugin::new(settings)) as Box<dyn Plugin>)
    })
    .with_settings(settings)
}

pub struct ChatPlugin {
    settings: Arc<ChatSettings>,
    subscription: Option<SubscriptionHandle>,
}

impl ChatPlugin {
    pub fn new(settings: ChatSettings) -> Self {
        Self {
            settings: Arc::new(settings),
            subscription: None,
        }
    }
}

#[async_trait]
impl Plugin for ChatPlugin {
    async fn setup(&mut self, ctx: &PluginContext) -> Result<(), PluginError> {
        let relay = ChatRelay {
            entities: ctx.entities().clone(),
            settings: self.settings.clone(),
        };
        self.subscription = Some(ctx.events().subscribe(EventKind::AnyPlayer, Arc::new(relay))?);
        log::info!("Chat plugin ready");
        Ok(())
    }

    async fn shutdown(&mut self, ctx: &PluginContext) -> Result<(), PluginError> {
        log::info!("Shutting down chat plugin");
        if let Some(handle) = self.subscription.take() {
            if !ctx.events().unsubscribe(handle) {
                log::warn!("Chat relay subscription {} was already gone", handle);
            }
        }
        Ok(())
    }
}

struct ChatRelay {
    entities: Arc<EntityDirectory>,
    settings: Arc<ChatSettings>,
}

impl ChatRelay {
    /// Send to every online player except `skip`; one failed delivery does not
    /// stop the others.
    fn broadcast(&self, message: &Message, skip: Option<EntityId>) {
        for player in self.entities.online() {
            if Some(player.id()) == skip {
                continue;
            }
            if let Err(e) = player.send_message(message.clone()) {
                log::warn!("Chat delivery to {} failed: {}", player.name(), e);
            }
        }
    }
}

#[async_trait]
impl EventHandler for ChatRelay {
    async fn handle(&self, event: &Event) -> Result<(), BoxError> {
        match event {
            Event::PlayerJoin(join) => {
                let player = self.entities.lookup(join.entity_id)?;
                let style = Style::new().with("color", self.settings.color.as_str());
                let text = self.settings.welcome_for(&player.display_name());
                player.send_message(Message::Structured(TextComponent::styled(text, style)))?;
            }
            Event::PlayerChat(chat) => {
                let speaker = self.entities.lookup(chat.entity_id)?;
                let line = TextComponent::styled(
                    format!("<{}> ", speaker.display_name()),
                    Style::new().with("bold", true),
                )
                .append(TextComponent::plain(chat.message.clone()));
                self.broadcast(&Message::Structured(line), None);
            }
            Event::PlayerQuit(quit) if self.settings.announce_quits => {
                let notice = TextComponent::styled(
                    format!("{} left the game", quit.name),
                    Style::new().with("color", "gray"),
                );
                self.broadcast(&Message::Structured(notice), Some(quit.entity_id));
            }
            _ => {}
        }
        Ok(())
    }
}
