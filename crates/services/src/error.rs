//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;
use study_core::ingest::IngestError;
use study_core::model::{ContentId, ParentRef, RecordError, TopicId, UserId};
use study_core::tree::StructuralError;

/// Errors emitted by `CatalogService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("topic {0} not found")]
    NotFound(TopicId),
    #[error(transparent)]
    Validation(IngestError),
    #[error(transparent)]
    Structural(#[from] StructuralError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<IngestError> for CatalogError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::TopicNotFound(id) => CatalogError::NotFound(id),
            other => CatalogError::Validation(other),
        }
    }
}

/// Errors emitted by `ProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("content {0} is not a lesson of this topic")]
    NotALesson(ContentId),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `AdminService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AdminError {
    #[error("user {0} is not an administrator")]
    Forbidden(UserId),
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },
    #[error("parent {parent:?} belongs to topic {parent_topic_id}")]
    CrossTopicParent {
        parent: ParentRef,
        parent_topic_id: TopicId,
    },
    #[error(transparent)]
    Record(#[from] RecordError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `CharacterService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CharacterError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
