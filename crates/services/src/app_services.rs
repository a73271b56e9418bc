use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::admin_service::AdminService;
use crate::catalog_service::CatalogService;
use crate::character_service::CharacterService;
use crate::config::{AppConfig, CatalogConfig};
use crate::error::AppServicesError;
use crate::progress_service::ProgressService;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    catalog: Arc<CatalogService>,
    progress: Arc<ProgressService>,
    admin: Arc<AdminService>,
    characters: Arc<CharacterService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(config: &AppConfig, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(&config.db_url).await?;
        tracing::info!(db_url = %config.db_url, "storage ready");
        Ok(Self::from_storage(&storage, clock, config.catalog))
    }

    /// Build services from environment configuration.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn from_env(clock: Clock) -> Result<Self, AppServicesError> {
        Self::new_sqlite(&AppConfig::from_env(), clock).await
    }

    #[must_use]
    pub fn from_storage(storage: &Storage, clock: Clock, catalog: CatalogConfig) -> Self {
        let catalog = Arc::new(CatalogService::new(storage, catalog));
        let progress = Arc::new(ProgressService::new(
            clock,
            Arc::clone(&storage.progress),
            Arc::clone(&catalog),
        ));
        let admin = Arc::new(AdminService::new(clock, storage, Arc::clone(&catalog)));
        let characters = Arc::new(CharacterService::new(Arc::clone(&storage.characters)));
        Self {
            catalog,
            progress,
            admin,
            characters,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<CatalogService> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress)
    }

    #[must_use]
    pub fn admin(&self) -> Arc<AdminService> {
        Arc::clone(&self.admin)
    }

    #[must_use]
    pub fn characters(&self) -> Arc<CharacterService> {
        Arc::clone(&self.characters)
    }
}
