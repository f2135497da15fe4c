use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{EntityKind, UserQueryProfile};

/// Request to rank candidates of one kind
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FindRecommendationsRequest {
    pub kind: EntityKind,
    #[validate(length(min = 1, message = "embedding must not be empty"))]
    pub embedding: Vec<f32>,
    #[serde(default)]
    #[serde(alias = "region_filter", rename = "regionFilter")]
    pub region_filter: Vec<String>,
    #[serde(default)]
    #[serde(alias = "keyword_filter", rename = "keywordFilter")]
    pub keyword_filter: Vec<String>,
    /// Falls back to the configured default when absent
    #[validate(range(min = 1))]
    #[serde(alias = "target_count", rename = "targetCount")]
    pub target_count: Option<usize>,
    #[serde(default)]
    #[serde(alias = "exclude_ids", rename = "excludeIds")]
    pub exclude_ids: Vec<String>,
}

impl FindRecommendationsRequest {
    /// Query profile with the target resolved against `default` and capped at `max`
    pub fn to_query(&self, default: usize, max: usize) -> UserQueryProfile {
        UserQueryProfile {
            embedding: self.embedding.clone(),
            region_filter: self.region_filter.clone(),
            keyword_filter: self.keyword_filter.clone(),
            target_count: self.target_count.unwrap_or(default).min(max),
            exclude_ids: self.exclude_ids.clone(),
        }
    }
}

/// Request for jobs and attractions from one preference vector
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BundleRecommendationsRequest {
    #[validate(length(min = 1, message = "embedding must not be empty"))]
    pub embedding: Vec<f32>,
    #[serde(default)]
    #[serde(alias = "region_filter", rename = "regionFilter")]
    pub region_filter: Vec<String>,
    #[serde(default)]
    #[serde(alias = "keyword_filter", rename = "keywordFilter")]
    pub keyword_filter: Vec<String>,
    #[validate(range(min = 1))]
    #[serde(alias = "job_count", rename = "jobCount")]
    pub job_count: Option<usize>,
    #[validate(range(min = 1))]
    #[serde(alias = "attraction_count", rename = "attractionCount")]
    pub attraction_count: Option<usize>,
    #[serde(default)]
    #[serde(alias = "exclude_ids", rename = "excludeIds")]
    pub exclude_ids: Vec<String>,
}

impl BundleRecommendationsRequest {
    pub fn to_query(&self, kind: EntityKind, default: usize, max: usize) -> UserQueryProfile {
        let requested = match kind {
            EntityKind::Job => self.job_count,
            EntityKind::Attraction => self.attraction_count,
        };
        UserQueryProfile {
            embedding: self.embedding.clone(),
            region_filter: self.region_filter.clone(),
            keyword_filter: self.keyword_filter.clone(),
            target_count: requested.unwrap_or(default).min(max),
            exclude_ids: self.exclude_ids.clone(),
        }
    }
}

/// Request to preview the region expansion plan
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PlanRegionsRequest {
    #[validate(length(max = 50))]
    #[serde(default)]
    #[serde(alias = "region_filter", rename = "regionFilter")]
    pub region_filter: Vec<String>,
}

/// Query string of `GET /regions/normalize`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NormalizeRegionQuery {
    #[validate(length(min = 1, max = 200))]
    pub text: String,
}
