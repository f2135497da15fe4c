use serde::Serialize;
use thiserror::Error;

use crate::models::EntityKind;

/// Programmer errors that abort a recommendation call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("Embedding dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("Target count must be greater than zero")]
    InvalidTargetCount,
}

/// Data-quality conditions the engine degrades around instead of failing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum DataQualityIssue {
    /// A region term matched no known administrative unit
    UnknownRegion { region: String },

    /// A kind has no entity with an embedding
    EmptyCandidatePool { kind: EntityKind },

    /// Zero-magnitude embedding; `entity_id` is `None` for the query itself
    DegenerateVector { entity_id: Option<String> },
}
