use thiserror::Error;

use crate::ingest::IngestError;
use crate::model::RecordError;
use crate::tree::StructuralError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Record(#[from] RecordError),
    #[error(transparent)]
    Ingest(#[from] IngestError),
    #[error(transparent)]
    Structural(#[from] StructuralError),
}
