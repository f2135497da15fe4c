use std::collections::HashSet;

/// Scores how many of the user's keyword hints appear in a candidate's text
///
/// Each distinct keyword found as a case-insensitive substring adds a fixed
/// increment; the total is capped at 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeywordMatcher {
    increment: f64,
}

impl KeywordMatcher {
    pub const DEFAULT_INCREMENT: f64 = 0.2;

    pub fn new(increment: f64) -> Self {
        Self {
            increment: increment.clamp(0.0, 1.0),
        }
    }

    pub fn increment(&self) -> f64 {
        self.increment
    }

    /// Score `text` against `keywords`
    ///
    /// # Returns
    /// A value in [0, 1]. An empty keyword list is neutral and yields `0.0`.
    #[inline]
    pub fn score<S: AsRef<str>>(&self, text: &str, keywords: &[S]) -> f64 {
        if keywords.is_empty() {
            return 0.0;
        }

        let matched = self.matched_keywords(text, keywords).len() as f64;
        (matched * self.increment).min(1.0)
    }

    /// Distinct keywords (lowercased) present in `text`, in input order
    pub fn matched_keywords<S: AsRef<str>>(&self, text: &str, keywords: &[S]) -> Vec<String> {
        let haystack = text.to_lowercase();
        let mut seen = HashSet::new();
        let mut matched = Vec::new();

        for keyword in keywords {
            let needle = keyword.as_ref().trim().to_lowercase();
            if needle.is_empty() || !seen.insert(needle.clone()) {
                continue;
            }
            if haystack.contains(&needle) {
                matched.push(needle);
            }
        }

        matched
    }
}

impl Default for KeywordMatcher {
    fn default() -> Self {
        Self::new(Self::DEFAULT_INCREMENT)
    }
}
