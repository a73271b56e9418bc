#![forbid(unsafe_code)]

pub mod admin_service;
pub mod app_services;
pub mod catalog_service;
pub mod character_service;
pub mod config;
pub mod error;
pub mod progress_service;
mod tree_cache;

pub use study_core::Clock;

pub use admin_service::{AdminService, CategoryDraft, CharacterDraft, ContentDraft, TopicDraft};
pub use app_services::AppServices;
pub use catalog_service::{CatalogService, UserProgressView};
pub use character_service::CharacterService;
pub use config::{AppConfig, CatalogConfig};
pub use error::{AdminError, AppServicesError, CatalogError, CharacterError, ProgressError};
pub use progress_service::{ProgressOverview, ProgressService, TopicOverview};
