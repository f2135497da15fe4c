use crate::models::{EntityKind, RegionLevel, ScoringProfile, ScoringWeights};

/// Combine the three score components with a kind's weight profile
///
/// Scoring formula:
/// score = (
///     vector_score * profile.vector +    # Semantic similarity to the user
///     region_weight * profile.region +   # How closely the region matched
///     keyword_score * profile.keyword    # Keyword hint overlap
/// )
#[inline]
pub fn combine(profile: &ScoringProfile, vector_score: f64, region_weight: f64, keyword_score: f64) -> f64 {
    vector_score * profile.vector + region_weight * profile.region + keyword_score * profile.keyword
}

/// Final score of a farm job: 0.70·v + 0.25·r + 0.05·k
#[inline]
pub fn score_job(vector_score: f64, region_weight: f64, keyword_score: f64) -> f64 {
    combine(&ScoringProfile::JOB, vector_score, region_weight, keyword_score)
}

/// Final score of a tourist attraction: 0.60·v + 0.20·r + 0.20·k
#[inline]
pub fn score_attraction(vector_score: f64, region_weight: f64, keyword_score: f64) -> f64 {
    combine(&ScoringProfile::ATTRACTION, vector_score, region_weight, keyword_score)
}

/// Final score for `kind` using configured weights
#[inline]
pub fn calculate_final_score(
    kind: EntityKind,
    vector_score: f64,
    region_weight: f64,
    keyword_score: f64,
    weights: &ScoringWeights,
) -> f64 {
    combine(weights.for_kind(kind), vector_score, region_weight, keyword_score)
}

/// Human-readable score breakdown, e.g. `vector:0.71 • region:province-match:0.7 • keyword:0.40`
pub fn explain(vector_score: f64, label: RegionLevel, region_weight: f64, keyword_score: f64) -> String {
    format!(
        "vector:{:.2} • region:{}:{:.1} • keyword:{:.2}",
        vector_score, label, region_weight, keyword_score
    )
}

/// One-line description of a profile for API consumers
pub fn describe_profile(profile: &ScoringProfile) -> String {
    format!(
        "vector {:.0}% + region {:.0}% + keyword {:.0}%",
        profile.vector * 100.0,
        profile.region * 100.0,
        profile.keyword * 100.0
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_job() {
        let score = score_job(1.0, 1.0, 1.0);
        assert!((score - 1.0).abs() < 1e-12);

        let vector_only = score_job(0.5, 0.0, 0.0);
        assert!((vector_only - 0.35).abs() < 1e-12);
    }

    #[test]
    fn test_score_attraction() {
        let score = score_attraction(0.5, 1.0, 0.4);
        assert!((score - (0.30 + 0.20 + 0.08)).abs() < 1e-12);
    }

    #[test]
    fn test_attraction_weighs_keywords_higher() {
        let job_gain = score_job(0.5, 1.0, 1.0) - score_job(0.5, 1.0, 0.0);
        let attraction_gain = score_attraction(0.5, 1.0, 1.0) - score_attraction(0.5, 1.0, 0.0);
        assert!(attraction_gain > job_gain);
    }

    #[test]
    fn test_pure_function() {
        let first = score_job(0.73, 0.7, 0.2);
        let second = score_job(0.73, 0.7, 0.2);
        assert_eq!(first.to_bits(), second.to_bits());
    }

    #[test]
    fn test_final_score_uses_kind_profile() {
        let weights = ScoringWeights::default();
        assert_eq!(
            calculate_final_score(EntityKind::Job, 0.4, 0.9, 0.2, &weights),
            score_job(0.4, 0.9, 0.2)
        );
        assert_eq!(
            calculate_final_score(EntityKind::Attraction, 0.4, 0.9, 0.2, &weights),
            score_attraction(0.4, 0.9, 0.2)
        );
    }

    #[test]
    fn test_explain_format() {
        let text = explain(0.712, RegionLevel::Province, 0.7, 0.4);
        assert_eq!(text, "vector:0.71 • region:province-match:0.7 • keyword:0.40");
    }

    #[test]
    fn test_describe_profile() {
        assert_eq!(
            describe_profile(&ScoringProfile::JOB),
            "vector 70% + region 25% + keyword 5%"
        );
    }
}
