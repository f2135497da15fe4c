//! Rural Planner Algo - Region-aware recommendation engine for rural stays
//!
//! This library ranks farm jobs and tourist attractions against a user's
//! preference embedding, widening the geographic search step by step
//! (exact region, aliases, province, neighboring provinces) until enough
//! results are found.

pub mod config;
pub mod core;
pub mod models;
pub mod region;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{cosine_similarity, EngineError, KeywordMatcher, RecommendationResult, Recommender, RecommenderOptions};
pub use models::{CandidateEntity, EntityKind, RegionLevel, ScoredResult, ScoringWeights, UserQueryProfile};
pub use region::{ExpansionPlanner, ExpansionWeights, RegionNormalizer, RegionTable};
pub use services::{CandidateSource, CandidateStore};
