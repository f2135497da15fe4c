// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    CandidateEntity, EntityKind, ExpansionLevel, RegionLevel, ScoredResult, ScoringProfile, ScoringWeights,
    UserQueryProfile,
};
pub use requests::{
    BundleRecommendationsRequest, FindRecommendationsRequest, NormalizeRegionQuery, PlanRegionsRequest,
};
pub use responses::{
    BundleRecommendationsResponse, ErrorResponse, FindRecommendationsResponse, HealthResponse, KindDiagnosis,
    KindRecommendations, NormalizeRegionResponse, PlanRegionsResponse, PoolDiagnosisResponse, RecommendationItem,
};
