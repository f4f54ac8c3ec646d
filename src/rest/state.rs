//! API state management for the REST server.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::Config;
use crate::tickets::{TicketError, TicketStore};
use crate::workflow::TicketStateFlowValidator;

/// Shared state for the REST API
#[derive(Clone)]
pub struct ApiState {
    /// Ticket store; state changes take the write lock for validate + persist.
    ///
    /// Saves are blocking `std::fs` writes made while the lock is held; move
    /// them to `spawn_blocking` if the store outgrows a single small JSON file.
    pub store: Arc<RwLock<TicketStore>>,
    /// Stateless, shared by all handlers
    pub validator: TicketStateFlowValidator,
    /// Application configuration
    pub config: Arc<Config>,
}

impl ApiState {
    /// Create API state backed by the configured ticket file
    pub fn new(config: Config) -> Result<Self, TicketError> {
        let store = TicketStore::open(config.tickets_file())?;
        Ok(Self::with_store(config, store))
    }

    /// Create API state around an existing store
    pub fn with_store(config: Config, store: TicketStore) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            validator: TicketStateFlowValidator::new(),
            config: Arc::new(config),
        }
    }
}
