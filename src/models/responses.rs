use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::SearchDiagnostics;
use crate::models::domain::{EntityKind, ExpansionLevel, RegionLevel, ScoredResult};
use crate::region::RegionMatch;
use crate::services::RegionCount;

/// One ranked entity as returned over HTTP
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationItem {
    pub id: String,
    pub kind: EntityKind,
    pub name: String,
    pub region: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub keywords: Vec<String>,
    pub vector_score: f64,
    pub region_weight: f64,
    pub region_label: RegionLevel,
    pub keyword_score: f64,
    pub final_score: f64,
    pub explanation: String,
    pub closest_match: bool,
}

impl From<&ScoredResult> for RecommendationItem {
    fn from(result: &ScoredResult) -> Self {
        let entity = &result.entity;
        Self {
            id: entity.id.clone(),
            kind: entity.kind,
            name: entity.name.clone(),
            region: entity.region.clone(),
            description: entity.description.clone(),
            keywords: entity.keywords.clone(),
            vector_score: result.vector_score,
            region_weight: result.region_weight,
            region_label: result.region_label,
            keyword_score: result.keyword_score,
            final_score: result.final_score,
            explanation: result.explanation.clone(),
            closest_match: result.is_closest_match(),
        }
    }
}

/// Response for the find recommendations endpoint
#[derive(Debug, Clone, Serialize)]
pub struct FindRecommendationsResponse {
    pub request_id: uuid::Uuid,
    pub generated_at: chrono::DateTime<chrono::Utc>,
    pub recommendations: Vec<RecommendationItem>,
    pub total_results: usize,
    pub diagnostics: SearchDiagnostics,
}

/// Results of one kind inside a bundle
#[derive(Debug, Clone, Serialize)]
pub struct KindRecommendations {
    pub recommendations: Vec<RecommendationItem>,
    pub diagnostics: SearchDiagnostics,
}

/// Response for the bundle endpoint
#[derive(Debug, Clone, Serialize)]
pub struct BundleRecommendationsResponse {
    pub request_id: uuid::Uuid,
    pub generated_at: chrono::DateTime<chrono::Utc>,
    pub jobs: KindRecommendations,
    pub attractions: KindRecommendations,
    /// Human-readable scoring formula per kind
    pub scoring: BTreeMap<EntityKind, String>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub jobs: usize,
    pub attractions: usize,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

/// Normalizer output for one text
#[derive(Debug, Clone, Serialize)]
pub struct NormalizeRegionResponse {
    pub input: String,
    pub generic: bool,
    #[serde(rename = "match")]
    pub region: Option<RegionMatch>,
}

/// Planner output for a region filter
#[derive(Debug, Clone, Serialize)]
pub struct PlanRegionsResponse {
    pub region_filter: Vec<String>,
    pub nationwide: bool,
    pub levels: Vec<ExpansionLevel>,
    pub unresolved: Vec<String>,
}

/// Entity counts and most common regions of one kind
#[derive(Debug, Clone, Serialize)]
pub struct KindDiagnosis {
    pub total: usize,
    pub usable: usize,
    pub top_regions: Vec<RegionCount>,
}

/// Snapshot of the candidate pool
#[derive(Debug, Clone, Serialize)]
pub struct PoolDiagnosisResponse {
    pub generated_at: chrono::DateTime<chrono::Utc>,
    pub jobs: KindDiagnosis,
    pub attractions: KindDiagnosis,
}
