//! Shared application state for all routes.

use crate::store::{InMemoryStore, Store};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
}

impl AppState {
    pub fn new(store: impl Store + 'static) -> Self {
        AppState {
            store: Arc::new(store),
        }
    }

    /// State over an empty in-memory store.
    pub fn in_memory() -> Self {
        Self::new(InMemoryStore::new())
    }
}
