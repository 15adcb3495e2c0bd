use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entity::EntityId;

/// Tag of an event variant or of an event category.
///
/// Leaf kinds correspond one to one with [`Event`] variants. Category kinds
/// (`AnyPlayer`, `AnyHost`, `Any`) only exist as subscription targets: a
/// subscriber to a category receives every event whose kind descends from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    PlayerJoin,
    PlayerQuit,
    PlayerChat,
    HostStarted,
    HostStopping,
    Custom,
    AnyPlayer,
    AnyHost,
    Any,
}

impl EventKind {
    /// The category directly above this kind, `None` for [`EventKind::Any`]
    pub fn parent(self) -> Option<EventKind> {
        match self {
            EventKind::PlayerJoin | EventKind::PlayerQuit | EventKind::PlayerChat => {
                Some(EventKind::AnyPlayer)
            }
            EventKind::HostStarted | EventKind::HostStopping => Some(EventKind::AnyHost),
            EventKind::Custom | EventKind::AnyPlayer | EventKind::AnyHost => Some(EventKind::Any),
            EventKind::Any => None,
        }
    }

    /// Whether a subscription to `subscribed` receives events of this kind.
    pub fn is_covered_by(self, subscribed: EventKind) -> bool {
        let mut current = Some(self);
        while let Some(kind) = current {
            if kind == subscribed {
                return true;
            }
            current = kind.parent();
        }
        false
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::PlayerJoin => "player.join",
            EventKind::PlayerQuit => "player.quit",
            EventKind::PlayerChat => "player.chat",
            EventKind::HostStarted => "host.started",
            EventKind::HostStopping => "host.stopping",
            EventKind::Custom => "custom",
            EventKind::AnyPlayer => "player.*",
            EventKind::AnyHost => "host.*",
            EventKind::Any => "*",
        };
        f.write_str(name)
    }
}

/// A participant joined the session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerJoinEvent {
    pub entity_id: EntityId,
    pub name: String,
}

/// A participant left the session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerQuitEvent {
    pub entity_id: EntityId,
    pub name: String,
}

/// A participant sent a chat line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerChatEvent {
    pub entity_id: EntityId,
    pub message: String,
}

/// Plugin-defined event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomEvent {
    /// Source plugin identifier
    pub source: String,
    /// Free-form channel name, e.g. "economy.paid"
    pub channel: String,
    pub payload: Value,
}

/// Every event that flows through the registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    PlayerJoin(PlayerJoinEvent),
    PlayerQuit(PlayerQuitEvent),
    PlayerChat(PlayerChatEvent),
    /// All plugins finished the start phase
    HostStarted { plugins: usize },
    /// The host is about to shut plugins down
    HostStopping,
    Custom(CustomEvent),
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::PlayerJoin(_) => EventKind::PlayerJoin,
            Event::PlayerQuit(_) => EventKind::PlayerQuit,
            Event::PlayerChat(_) => EventKind::PlayerChat,
            Event::HostStarted { .. } => EventKind::HostStarted,
            Event::HostStopping => EventKind::HostStopping,
            Event::Custom(_) => EventKind::Custom,
        }
    }

    /// Get the name of this event
    pub fn name(&self) -> &'static str {
        match self {
            Event::PlayerJoin(_) => "player.join",
            Event::PlayerQuit(_) => "player.quit",
            Event::PlayerChat(_) => "player.chat",
            Event::HostStarted { .. } => "host.started",
            Event::HostStopping => "host.stopping",
            Event::Custom(_) => "custom",
        }
    }

    /// The entity this event is about, if any
    pub fn entity_id(&self) -> Option<EntityId> {
        match self {
            Event::PlayerJoin(e) => Some(e.entity_id),
            Event::PlayerQuit(e) => Some(e.entity_id),
            Event::PlayerChat(e) => Some(e.entity_id),
            Event::HostStarted { .. } | Event::HostStopping | Event::Custom(_) => None,
        }
    }
}

impl From<PlayerJoinEvent> for Event {
    fn from(event: PlayerJoinEvent) -> Self {
        Event::PlayerJoin(event)
    }
}

impl From<PlayerQuitEvent> for Event {
    fn from(event: PlayerQuitEvent) -> Self {
        Event::PlayerQuit(event)
    }
}

impl From<PlayerChatEvent> for Event {
    fn from(event: PlayerChatEvent) -> Self {
        Event::PlayerChat(event)
    }
}

impl From<CustomEvent> for Event {
    fn from(event: CustomEvent) -> Self {
        Event::Custom(event)
    }
}
