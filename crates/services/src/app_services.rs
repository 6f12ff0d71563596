use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::catalog_service::CatalogService;
use crate::sessions::PlayService;

/// Assembles the app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    catalog: Arc<CatalogService>,
    play: Arc<PlayService>,
}

impl AppServices {
    /// Build services backed by the in-memory store.
    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::from_storage(&Storage::in_memory(), clock)
    }

    #[must_use]
    pub fn from_storage(storage: &Storage, clock: Clock) -> Self {
        Self {
            catalog: Arc::new(CatalogService::new(storage)),
            play: Arc::new(PlayService::new(clock, Arc::clone(&storage.questions))),
        }
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<CatalogService> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn play(&self) -> Arc<PlayService> {
        Arc::clone(&self.play)
    }
}
