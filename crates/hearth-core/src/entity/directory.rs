use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use crate::entity::{AddressableEntity, EntityError, EntityId, Player, Session, SessionReceiver};

#[derive(Default)]
struct DirectoryState {
    entities: HashMap<EntityId, Arc<Player>>,
    // join order, used for listing
    order: Vec<EntityId>,
}

/// Host-owned directory of live entities, consulted by plugins through their
/// context.
pub struct EntityDirectory {
    state: RwLock<DirectoryState>,
    max_message_bytes: usize,
}

impl EntityDirectory {
    /// Create an empty directory. Players created through [`join`](Self::join)
    /// enforce `max_message_bytes` on every send.
    pub fn new(max_message_bytes: usize) -> Self {
        Self {
            state: RwLock::new(DirectoryState::default()),
            max_message_bytes,
        }
    }

    /// Register a new participant with a fresh id and a live session.
    pub fn join(&self, name: &str) -> Result<(Arc<Player>, SessionReceiver), EntityError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let mut id = EntityId::new_v4();
        while state.entities.contains_key(&id) {
            id = EntityId::new_v4();
        }

        let player = Arc::new(Player::new(id, name, self.max_message_bytes)?);
        let (session, receiver) = Session::channel();
        player.bind_session(session);

        state.entities.insert(id, player.clone());
        state.order.push(id);
        log::info!("Entity joined: {} ({})", name, id);
        Ok((player, receiver))
    }

    /// Register an externally constructed player.
    pub fn insert(&self, player: Arc<Player>) -> Result<(), EntityError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let id = player.id();
        if state.entities.contains_key(&id) {
            return Err(EntityError::DuplicateId(id));
        }
        state.entities.insert(id, player);
        state.order.push(id);
        Ok(())
    }

    pub fn lookup(&self, id: EntityId) -> Result<Arc<Player>, EntityError> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entities
            .get(&id)
            .cloned()
            .ok_or(EntityError::NotFound(id))
    }

    /// Remove an entity and drop its session binding.
    pub fn disconnect(&self, id: EntityId) -> Result<Arc<Player>, EntityError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let player = state.entities.remove(&id).ok_or(EntityError::NotFound(id))?;
        state.order.retain(|existing| *existing != id);
        player.unbind_session();
        log::info!("Entity disconnected: {} ({})", player.name(), id);
        Ok(player)
    }

    /// Disconnect every live entity. Returns how many were removed.
    pub fn disconnect_all(&self) -> usize {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let count = state.entities.len();
        for (_, player) in state.entities.drain() {
            player.unbind_session();
        }
        state.order.clear();
        count
    }

    /// Live entities in join order
    pub fn online(&self) -> Vec<Arc<Player>> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state
            .order
            .iter()
            .filter_map(|id| state.entities.get(id).cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.state.read().unwrap_or_else(PoisonError::into_inner).entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn max_message_bytes(&self) -> usize {
        self.max_message_bytes
    }
}

impl fmt::Debug for EntityDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityDirectory")
            .field("entities", &self.len())
            .field("max_message_bytes", &self.max_message_bytes)
            .finish()
    }
}
