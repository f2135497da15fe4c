use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::models::{CandidateEntity, EntityKind};
use crate::region::fold_key;

/// Errors that can occur while loading a candidate snapshot
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read candidate snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid candidate snapshot: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Duplicate candidate id: {0}")]
    DuplicateId(String),
}

/// Where the recommender gets its candidates from
///
/// Implementations must return an immutable view; the engine never writes back.
pub trait CandidateSource: Send + Sync {
    /// Entities of `kind` whose region contains `region_pattern`
    ///
    /// Matching is a substring test on folded keys, so "Gochang-gun" finds
    /// "Jeonbuk Gochang Gun". An empty pattern matches nothing.
    fn fetch_candidates(&self, kind: EntityKind, region_pattern: &str) -> Vec<Arc<CandidateEntity>>;

    /// Every entity of `kind`
    fn fetch_all(&self, kind: EntityKind) -> Vec<Arc<CandidateEntity>>;
}

#[derive(Debug, Clone)]
struct IndexedEntity {
    folded_region: String,
    entity: Arc<CandidateEntity>,
}

/// Snapshot file layout: `{"jobs": [...], "attractions": [...]}`
#[derive(Debug, Default, Deserialize)]
struct SnapshotFile {
    #[serde(default)]
    jobs: Vec<SnapshotEntity>,
    #[serde(default)]
    attractions: Vec<SnapshotEntity>,
}

/// Entity as stored in the snapshot, where the kind comes from the list
#[derive(Debug, Deserialize)]
struct SnapshotEntity {
    id: String,
    name: String,
    region: String,
    #[serde(default)]
    embedding: Vec<f32>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    keywords: Vec<String>,
}

impl SnapshotEntity {
    fn into_entity(self, kind: EntityKind) -> CandidateEntity {
        CandidateEntity {
            id: self.id,
            kind,
            name: self.name,
            region: self.region,
            embedding: self.embedding,
            description: self.description,
            keywords: self.keywords,
        }
    }
}

/// Region and its number of entities
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionCount {
    pub region: String,
    pub count: usize,
}

/// Immutable in-memory candidate pool, indexed per kind
#[derive(Debug, Clone, Default)]
pub struct CandidateStore {
    jobs: Vec<IndexedEntity>,
    attractions: Vec<IndexedEntity>,
}

impl CandidateStore {
    pub fn from_entities(entities: Vec<CandidateEntity>) -> Result<Self, StoreError> {
        let mut seen = HashSet::new();
        let mut store = Self::default();

        for entity in entities {
            if !seen.insert(entity.id.clone()) {
                return Err(StoreError::DuplicateId(entity.id));
            }
            let indexed = IndexedEntity {
                folded_region: fold_key(&entity.region),
                entity: Arc::new(entity),
            };
            match indexed.entity.kind {
                EntityKind::Job => store.jobs.push(indexed),
                EntityKind::Attraction => store.attractions.push(indexed),
            }
        }

        Ok(store)
    }

    /// Parse a `{"jobs": [...], "attractions": [...]}` snapshot
    pub fn from_json_str(json: &str) -> Result<Self, StoreError> {
        let file: SnapshotFile = serde_json::from_str(json)?;
        let entities = file
            .jobs
            .into_iter()
            .map(|e| e.into_entity(EntityKind::Job))
            .chain(
                file.attractions
                    .into_iter()
                    .map(|e| e.into_entity(EntityKind::Attraction)),
            )
            .collect();
        Self::from_entities(entities)
    }

    /// Load a snapshot file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        tracing::info!("Loading candidate snapshot from {}", path.display());

        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| StoreError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let store = Self::from_json_str(&json)?;

        tracing::info!(
            "Loaded {} jobs ({} usable) and {} attractions ({} usable)",
            store.len(EntityKind::Job),
            store.usable_count(EntityKind::Job),
            store.len(EntityKind::Attraction),
            store.usable_count(EntityKind::Attraction)
        );

        Ok(store)
    }

    fn pool(&self, kind: EntityKind) -> &[IndexedEntity] {
        match kind {
            EntityKind::Job => &self.jobs,
            EntityKind::Attraction => &self.attractions,
        }
    }

    pub fn len(&self, kind: EntityKind) -> usize {
        self.pool(kind).len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty() && self.attractions.is_empty()
    }

    /// Entities of `kind` that carry an embedding
    pub fn usable_count(&self, kind: EntityKind) -> usize {
        self.pool(kind).iter().filter(|e| e.entity.is_usable()).count()
    }

    /// Most common regions of `kind`, count-descending then by name
    pub fn region_histogram(&self, kind: EntityKind, top: usize) -> Vec<RegionCount> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for indexed in self.pool(kind) {
            *counts.entry(indexed.entity.region.as_str()).or_insert(0) += 1;
        }

        let mut histogram: Vec<RegionCount> = counts
            .into_iter()
            .map(|(region, count)| RegionCount {
                region: region.to_string(),
                count,
            })
            .collect();
        histogram.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.region.cmp(&b.region)));
        histogram.truncate(top);
        histogram
    }
}

impl CandidateSource for CandidateStore {
    fn fetch_candidates(&self, kind: EntityKind, region_pattern: &str) -> Vec<Arc<CandidateEntity>> {
        let needle = fold_key(region_pattern);
        if needle.is_empty() {
            return Vec::new();
        }

        self.pool(kind)
            .iter()
            .filter(|indexed| indexed.folded_region.contains(&needle))
            .map(|indexed| Arc::clone(&indexed.entity))
            .collect()
    }

    fn fetch_all(&self, kind: EntityKind) -> Vec<Arc<CandidateEntity>> {
        self.pool(kind)
            .iter()
            .map(|indexed| Arc::clone(&indexed.entity))
            .collect()
    }
}
