//! Economy plugin for the Hearth host.
//!
//! Keeps an in-memory coin balance per player. New players are credited a
//! starting balance and told about it, and the account is closed when they
//! leave. Transfers are requested by publishing a custom event on the
//! `economy.transfer` channel with a
//! `{ "from": <uuid>, "to": <uuid>, "amount": <u64> }` payload.
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use hearth_core::entity::{AddressableEntity, EntityDirectory, EntityId};
use hearth_core::event::{BoxError, Event, EventHandler, EventKind};
use hearth_core::plugin_system::{Plugin, PluginContext, PluginDescriptor, PluginError};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

pub const PLUGIN_ID: &str = "economy";

/// Custom event channel carrying [`TransferRequest`] payloads
pub const TRANSFER_CHANNEL: &str = "economy.transfer";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EconomySettings {
    pub starting_balance: u64,
    pub currency: String,
}

impl Default for EconomySettings {
    fn default() -> Self {
        Self {
            starting_balance: 100,
            currency: "coins".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("No account for entity {0}")]
    UnknownAccount(EntityId),

    #[error("Entity {entity} has {balance}, cannot pay {amount}")]
    InsufficientFunds {
        entity: EntityId,
        balance: u64,
        amount: u64,
    },

    #[error("Crediting {amount} to entity {entity} would overflow its balance")]
    Overflow { entity: EntityId, amount: u64 },
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransferRequest {
    pub from: EntityId,
    pub to: EntityId,
    pub amount: u64,
}

/// Shared balance book. Cloning gives another handle to the same accounts.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    accounts: Arc<Mutex<HashMap<EntityId, u64>>>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance_of(&self, entity: EntityId) -> Option<u64> {
        self.accounts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&entity)
            .copied()
    }

    /// Open an account with `amount` unless one exists. Returns the balance.
    pub fn open(&self, entity: EntityId, amount: u64) -> u64 {
        *self
            .accounts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(entity)
            .or_insert(amount)
    }

    /// Close an account, returning its final balance
    pub fn close(&self, entity: EntityId) -> Option<u64> {
        self.accounts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&entity)
    }

    /// Move `amount` between two open accounts. Nothing changes on error.
    pub fn transfer(&self, from: EntityId, to: EntityId, amount: u64) -> Result<(), LedgerError> {
        let mut accounts = self.accounts.lock().unwrap_or_else(PoisonError::into_inner);
        let from_balance = *accounts.get(&from).ok_or(LedgerError::UnknownAccount(from))?;
        let to_balance = *accounts.get(&to).ok_or(LedgerError::UnknownAccount(to))?;
        let debited = from_balance
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientFunds {
                entity: from,
                balance: from_balance,
                amount,
            })?;
        if from == to {
            return Ok(());
        }
        let credited = to_balance
            .checked_add(amount)
            .ok_or(LedgerError::Overflow { entity: to, amount })?;
        accounts.insert(from, debited);
        accounts.insert(to, credited);
        Ok(())
    }

    pub fn total(&self) -> u128 {
        self.accounts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(|balance| u128::from(*balance))
            .sum()
    }

    pub fn len(&self) -> usize {
        self.accounts.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Descriptor with default settings and a private ledger
pub fn descriptor() -> PluginDescriptor {
    descriptor_with(Value::Null, Ledger::new())
}

/// Descriptor sharing `ledger` with the caller
pub fn descriptor_with(settings: Value, ledger: Ledger) -> PluginDescriptor {
    PluginDescriptor::new(PLUGIN_ID, move |ctx: &PluginContext| {
        let settings = if ctx.settings().is_null() {
            EconomySettings::default()
        } else {
            serde_json::from_value(ctx.settings().clone())
                .map_err(|e| PluginError::ConfigError(format!("invalid economy settings: {}", e)))?
        };
        Ok(Box::new(EconomyPlugin { settings, ledger }) as Box<dyn Plugin>)
    })
    .with_settings(settings)
}

pub struct EconomyPlugin {
    settings: EconomySettings,
    ledger: Ledger,
}

#[async_trait]
impl Plugin for EconomyPlugin {
    async fn setup(&mut self, ctx: &PluginContext) -> Result<(), PluginError> {
        let bank = Bank {
            entities: ctx.entities().clone(),
            ledger: self.ledger.clone(),
            settings: self.settings.clone(),
        };
        let bank = Arc::new(bank);
        ctx.events().subscribe(EventKind::PlayerJoin, bank.clone())?;
        ctx.events().subscribe(EventKind::PlayerQuit, bank.clone())?;
        ctx.events().subscribe(EventKind::Custom, bank)?;
        Ok(())
    }

    async fn shutdown(&mut self, _ctx: &PluginContext) -> Result<(), PluginError> {
        log::info!(
            "Economy shutting down with {} {} in circulation",
            self.ledger.total(),
            self.settings.currency
        );
        Ok(())
    }
}

struct Bank {
    entities: Arc<EntityDirectory>,
    ledger: Ledger,
    settings: EconomySettings,
}

impl Bank {
    fn notify(&self, entity: EntityId) -> Result<(), BoxError> {
        let player = self.entities.lookup(entity)?;
        let balance = self.ledger.balance_of(entity).unwrap_or(0);
        player.send_text(&format!("Balance: {} {}", balance, self.settings.currency))?;
        Ok(())
    }
}

#[async_trait]
impl EventHandler for Bank {
    async fn handle(&self, event: &Event) -> Result<(), BoxError> {
        match event {
            Event::PlayerJoin(join) => {
                self.ledger.open(join.entity_id, self.settings.starting_balance);
                self.notify(join.entity_id)?;
            }
            Event::PlayerQuit(quit) => {
                if let Some(balance) = self.ledger.close(quit.entity_id) {
                    log::debug!(
                        "Closed account of {} with {} {}",
                        quit.name,
                        balance,
                        self.settings.currency
                    );
                }
            }
            Event::Custom(custom) if custom.channel == TRANSFER_CHANNEL => {
                let request: TransferRequest = serde_json::from_value(custom.payload.clone())?;
                self.ledger.transfer(request.from, request.to, request.amount)?;
                log::debug!(
                    "Transferred {} {} from {} to {}",
                    request.amount,
                    self.settings.currency,
                    request.from,
                    request.to
                );
                for party in [request.from, request.to] {
                    if let Err(e) = self.notify(party) {
                        log::warn!("Could not notify {}: {}", party, e);
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }
}
