//! Persistence boundary for the game record.
//!
//! The engine performs no I/O. Embedders supply a store with
//! read-modify-write and subscribe semantics over the single game
//! record; the engine only cares that the caller reads the latest
//! snapshot right before invoking an operation. Writes are
//! last-writer-wins; conflict detection, retries, and network policy
//! all live behind this trait.

use crate::game::GameState;
use thiserror::Error;

/// Errors from a store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store backend unavailable: {0}")]
    Backend(String),
}

/// Callback invoked with the new state after every write, and with
/// `None` after the record is deleted.
pub type Listener = Box<dyn FnMut(Option<&GameState>) + Send>;

/// A store holding the single authoritative game record.
pub trait GameStore {
    /// Read the current record, if one exists.
    fn load(&self) -> Result<Option<GameState>, StoreError>;

    /// Replace the record.
    fn save(&mut self, state: &GameState) -> Result<(), StoreError>;

    /// Discard the record entirely (game reset / game over cleanup).
    fn delete(&mut self) -> Result<(), StoreError>;

    /// Register a listener notified after every save or delete.
    fn subscribe(&mut self, listener: Listener);
}

/// In-memory store for tests and single-process embedders.
#[derive(Default)]
pub struct MemoryStore {
    state: Option<GameState>,
    listeners: Vec<Listener>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn notify(&mut self) {
        let state = self.state.clone();
        for listener in self.listeners.iter_mut() {
            listener(state.as_ref());
        }
    }
}

impl GameStore for MemoryStore {
    fn load(&self) -> Result<Option<GameState>, StoreError> {
        Ok(self.state.clone())
    }

    fn save(&mut self, state: &GameState) -> Result<(), StoreError> {
        self.state = Some(state.clone());
        self.notify();
        Ok(())
    }

    fn delete(&mut self) -> Result<(), StoreError> {
        self.state = None;
        self.notify();
        Ok(())
    }

    fn subscribe(&mut self, listener: Listener) {
        self.listeners.push(listener);
    }
}
