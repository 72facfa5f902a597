//! Business logic services

pub mod sessions;

use std::sync::Arc;

use crate::{config::SessionsConfig, repository::InventoryStore};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub sessions: sessions::SessionService,
}

impl Services {
    /// Create all services over the given store
    pub fn new(store: Arc<dyn InventoryStore>, sessions_config: SessionsConfig) -> Self {
        Self {
            sessions: sessions::SessionService::new(store, sessions_config),
        }
    }
}
