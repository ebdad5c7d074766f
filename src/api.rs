//! HTTP API for the induction bot

mod handlers;
mod types;

pub use handlers::create_router;
#[allow(unused_imports)] // Public API re-exports
pub use types::*;

use crate::catalog::Catalog;
use crate::db::Database;
use crate::runtime::{ChatRuntime, DatabaseStorage, ProductionRuntime};
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub runtime: Arc<ProductionRuntime>,
}

impl AppState {
    pub fn new(db: Database, catalog: Catalog) -> Self {
        Self {
            runtime: Arc::new(ChatRuntime::new(
                DatabaseStorage::new(db),
                Arc::new(catalog),
            )),
        }
    }
}
