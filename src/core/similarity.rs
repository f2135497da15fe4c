use crate::core::error::EngineError;

/// Calculate the cosine similarity between two embeddings
///
/// Components are accumulated in f64 so the result does not depend on
/// argument order: `cosine_similarity(a, b) == cosine_similarity(b, a)`.
///
/// # Arguments
/// * `a` - First embedding
/// * `b` - Second embedding, must have the same length as `a`
///
/// # Returns
/// Similarity in [-1, 1], or `0.0` when either vector has zero magnitude
#[inline]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64, EngineError> {
    if a.len() != b.len() {
        return Err(EngineError::DimensionMismatch {
            expected: a.len(),
            found: b.len(),
        });
    }

    let mut dot = 0.0_f64;
    let mut norm_a = 0.0_f64;
    let mut norm_b = 0.0_f64;

    for (x, y) in a.iter().zip(b.iter()) {
        let x = f64::from(*x);
        let y = f64::from(*y);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    let similarity = dot / (norm_a.sqrt() * norm_b.sqrt());
    if !similarity.is_finite() {
        return Ok(0.0);
    }

    Ok(similarity.clamp(-1.0, 1.0))
}

/// Euclidean length of an embedding
#[inline]
pub fn magnitude(v: &[f32]) -> f64 {
    v.iter()
        .map(|x| f64::from(*x) * f64::from(*x))
        .sum::<f64>()
        .sqrt()
}

/// True for a zero-magnitude (or empty) embedding
#[inline]
pub fn is_degenerate(v: &[f32]) -> bool {
    magnitude(v) == 0.0
}
