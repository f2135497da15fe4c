use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of record the engine ranks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Job,
    Attraction,
}

impl EntityKind {
    pub const ALL: [EntityKind; 2] = [EntityKind::Job, EntityKind::Attraction];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Job => "job",
            EntityKind::Attraction => "attraction",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A farm job or tourist attraction with its precomputed embedding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateEntity {
    pub id: String,
    pub kind: EntityKind,
    /// Job title or attraction name
    pub name: String,
    /// Free-text administrative region, e.g. "Jeonbuk Gochang County"
    pub region: String,
    #[serde(default)]
    pub embedding: Vec<f32>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl CandidateEntity {
    /// Entities without an embedding cannot be compared and are skipped
    pub fn is_usable(&self) -> bool {
        !self.embedding.is_empty()
    }

    /// Text searched by the keyword matcher: name, description and tags
    pub fn searchable_text(&self) -> String {
        let mut text = self.name.clone();
        if let Some(description) = &self.description {
            text.push(' ');
            text.push_str(description);
        }
        for keyword in &self.keywords {
            text.push(' ');
            text.push_str(keyword);
        }
        text
    }
}

/// What the caller is looking for in one recommendation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserQueryProfile {
    pub embedding: Vec<f32>,
    #[serde(rename = "regionFilter", default)]
    pub region_filter: Vec<String>,
    #[serde(rename = "keywordFilter", default)]
    pub keyword_filter: Vec<String>,
    #[serde(rename = "targetCount")]
    pub target_count: usize,
    /// Ids that must never be returned (cards already shown or selected)
    #[serde(rename = "excludeIds", default)]
    pub exclude_ids: Vec<String>,
}

impl UserQueryProfile {
    pub fn new(embedding: Vec<f32>, target_count: usize) -> Self {
        Self {
            embedding,
            region_filter: Vec::new(),
            keyword_filter: Vec::new(),
            target_count,
            exclude_ids: Vec::new(),
        }
    }

    pub fn with_regions<I, S>(mut self, regions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.region_filter = regions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keyword_filter = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn excluding<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_ids = ids.into_iter().map(Into::into).collect();
        self
    }
}

/// How a result's region weight was earned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegionLevel {
    #[serde(rename = "exact")]
    Exact,
    #[serde(rename = "alias")]
    Alias,
    #[serde(rename = "province-match")]
    Province,
    #[serde(rename = "adjacent")]
    Adjacent,
    #[serde(rename = "nationwide")]
    Nationwide,
    #[serde(rename = "closest-match")]
    ClosestMatch,
}

impl RegionLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegionLevel::Exact => "exact",
            RegionLevel::Alias => "alias",
            RegionLevel::Province => "province-match",
            RegionLevel::Adjacent => "adjacent",
            RegionLevel::Nationwide => "nationwide",
            RegionLevel::ClosestMatch => "closest-match",
        }
    }
}

impl fmt::Display for RegionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One step of the progressively widening region search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpansionLevel {
    pub region_patterns: Vec<String>,
    pub weight: f64,
    pub label: RegionLevel,
}

impl ExpansionLevel {
    pub fn new(region_patterns: Vec<String>, weight: f64, label: RegionLevel) -> Self {
        Self {
            region_patterns,
            weight,
            label,
        }
    }
}

/// A ranked candidate with its score breakdown
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredResult {
    pub entity: std::sync::Arc<CandidateEntity>,
    pub vector_score: f64,
    pub region_weight: f64,
    pub region_label: RegionLevel,
    pub keyword_score: f64,
    pub final_score: f64,
    pub explanation: String,
}

impl ScoredResult {
    pub fn is_closest_match(&self) -> bool {
        self.region_label == RegionLevel::ClosestMatch
    }
}

/// Weights of the three score components for one entity kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringProfile {
    pub vector: f64,
    pub region: f64,
    pub keyword: f64,
}

impl ScoringProfile {
    pub const JOB: ScoringProfile = ScoringProfile {
        vector: 0.70,
        region: 0.25,
        keyword: 0.05,
    };

    /// Free-text tags discriminate tourist sites more than jobs
    pub const ATTRACTION: ScoringProfile = ScoringProfile {
        vector: 0.60,
        region: 0.20,
        keyword: 0.20,
    };
}

/// Scoring weights per entity kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub job: ScoringProfile,
    pub attraction: ScoringProfile,
}

impl ScoringWeights {
    pub fn for_kind(&self, kind: EntityKind) -> &ScoringProfile {
        match kind {
            EntityKind::Job => &self.job,
            EntityKind::Attraction => &self.attraction,
        }
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            job: ScoringProfile::JOB,
            attraction: ScoringProfile::ATTRACTION,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_searchable_text_includes_tags() {
        let entity = CandidateEntity {
            id: "a1".to_string(),
            kind: EntityKind::Attraction,
            name: "Horizon Festival".to_string(),
            region: "Jeonbuk Gimje City".to_string(),
            embedding: vec![1.0, 0.0],
            description: Some("harvest celebration".to_string()),
            keywords: vec!["rice".to_string(), "culture".to_string()],
        };

        let text = entity.searchable_text();
        assert!(text.contains("Horizon Festival"));
        assert!(text.contains("harvest"));
        assert!(text.contains("culture"));
    }

    #[test]
    fn test_entity_without_embedding_is_unusable() {
        let entity = CandidateEntity {
            id: "j1".to_string(),
            kind: EntityKind::Job,
            name: "Apple picking".to_string(),
            region: "Jeonbuk".to_string(),
            embedding: vec![],
            description: None,
            keywords: vec![],
        };
        assert!(!entity.is_usable());
    }

    #[test]
    fn test_region_level_labels() {
        assert_eq!(RegionLevel::Province.to_string(), "province-match");
        assert_eq!(RegionLevel::ClosestMatch.to_string(), "closest-match");
        assert_eq!(
            serde_json::to_string(&RegionLevel::Adjacent).unwrap(),
            "\"adjacent\""
        );
    }

    #[test]
    fn test_entity_kind_deserializes_lowercase() {
        let kind: EntityKind = serde_json::from_str("\"attraction\"").unwrap();
        assert_eq!(kind, EntityKind::Attraction);
    }

    #[test]
    fn test_default_weights() {
        let weights = ScoringWeights::default();
        assert_eq!(weights.for_kind(EntityKind::Job).vector, 0.70);
        assert_eq!(weights.for_kind(EntityKind::Attraction).keyword, 0.20);
    }
}
