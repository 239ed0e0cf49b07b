//! In-memory agent repository for testing.
//!
//! Stores MessagePack bytes in a shared map, so tests exercise the same
//! encoding as the file repository without touching the file system.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use crate::{
    Result,
    agents::{AgentSelector, SavedAgent},
    error::Error,
    ports::AgentRepository,
};

/// In-memory repository for testing.
///
/// # Examples
///
/// ```
/// use tictactoe_live::adapters::InMemoryRepository;
/// use tictactoe_live::agents::AgentSelector;
/// use tictactoe_live::ports::AgentRepository;
///
/// let repo = InMemoryRepository::new();
/// assert!(repo.load(AgentSelector::QLearning)?.is_none());
/// # Ok::<(), tictactoe_live::Error>(())
/// ```
///
/// # Thread Safety
///
/// All clones share the same underlying storage.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    storage: Arc<Mutex<HashMap<AgentSelector, Vec<u8>>>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn storage(&self) -> MutexGuard<'_, HashMap<AgentSelector, Vec<u8>>> {
        self.storage
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Number of stored agents
    pub fn count(&self) -> usize {
        self.storage().len()
    }

    pub fn clear(&self) {
        self.storage().clear();
    }

    /// Store raw bytes for a slot, bypassing encoding.
    pub fn insert_raw(&self, selector: AgentSelector, bytes: Vec<u8>) {
        self.storage().insert(selector, bytes);
    }
}

impl AgentRepository for InMemoryRepository {
    fn save(&self, agent: &SavedAgent) -> Result<()> {
        let bytes = rmp_serde::to_vec(agent).map_err(|e| Error::SerializationContext {
            operation: "serialize agent for in-memory storage".to_string(),
            message: e.to_string(),
        })?;
        self.storage().insert(agent.selector, bytes);
        Ok(())
    }

    fn load(&self, selector: AgentSelector) -> Result<Option<SavedAgent>> {
        let storage = self.storage();
        let Some(bytes) = storage.get(&selector) else {
            return Ok(None);
        };
        rmp_serde::from_slice(bytes)
            .map(Some)
            .map_err(|e| Error::SerializationContext {
                operation: "deserialize agent from in-memory storage".to_string(),
                message: e.to_string(),
            })
    }

    fn exists(&self, selector: AgentSelector) -> bool {
        self.storage().contains_key(&selector)
    }

    fn describe(&self, selector: AgentSelector) -> String {
        format!("memory://{}", selector.file_stem())
    }
}
