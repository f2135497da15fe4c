// Core algorithm exports
pub mod error;
pub mod keywords;
pub mod recommender;
pub mod scoring;
pub mod similarity;

pub use error::{DataQualityIssue, EngineError};
pub use keywords::KeywordMatcher;
pub use recommender::{
    LevelReport, RecommendationResult, Recommender, RecommenderOptions, SearchDiagnostics, SearchOutcome,
};
pub use scoring::{calculate_final_score, score_attraction, score_job};
pub use similarity::cosine_similarity;
