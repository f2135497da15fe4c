use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

use super::table::{fold_key, RegionTable, SubregionRef};

/// Canonical (province, subregion) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionMatch {
    pub province: String,
    pub subregion: Option<String>,
}

/// Index-level resolution used by the expansion planner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Resolved {
    pub province: usize,
    pub subregion: Option<SubregionRef>,
}

/// Canonicalizes free-text administrative region strings
#[derive(Debug, Clone)]
pub struct RegionNormalizer {
    table: Arc<RegionTable>,
}

impl RegionNormalizer {
    pub fn new(table: Arc<RegionTable>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &RegionTable {
        &self.table
    }

    /// Resolve `text` to a canonical province and optional subregion
    ///
    /// Tries, in order: exact alias match (including "province subregion"
    /// strings), the suffix-stripped province index, and finally the
    /// subregion reverse index. `None` when nothing matches.
    pub fn normalize_region(&self, text: &str) -> Option<RegionMatch> {
        self.resolve(text).map(|resolved| self.to_match(resolved))
    }

    /// Canonical province mentioned in `text`
    pub fn extract_province(&self, text: &str) -> Option<String> {
        let key = fold_key(text);
        self.province_of_key(&key)
            .and_then(|idx| self.table.province(idx))
            .map(|p| p.name.clone())
    }

    /// Canonical subregion mentioned in `text`; requires a known province
    pub fn extract_subregion(&self, text: &str) -> Option<String> {
        let key = fold_key(text);
        self.subregion_of_key(&key)
            .and_then(|sub_ref| self.table.subregion(sub_ref))
            .map(|s| s.name.clone())
    }

    pub fn is_generic(&self, term: &str) -> bool {
        self.table.is_generic(term)
    }

    /// Trimmed, non-generic region terms, deduplicated by folded key
    pub fn sanitize_filter<S: AsRef<str>>(&self, region_filter: &[S]) -> Vec<String> {
        let mut seen = HashSet::new();
        region_filter
            .iter()
            .map(|term| term.as_ref().trim())
            .filter(|term| !term.is_empty() && !self.is_generic(term))
            .filter(|term| {
                let key = fold_key(term);
                !key.is_empty() && seen.insert(key)
            })
            .map(str::to_string)
            .collect()
    }

    pub(crate) fn resolve(&self, text: &str) -> Option<Resolved> {
        let key = fold_key(text);
        if key.is_empty() {
            return None;
        }

        if let Some(province) = self.table.province_by_key(&key) {
            return Some(Resolved {
                province,
                subregion: None,
            });
        }

        if let Some((province, prefix_len)) = self.table.province_prefix(&key) {
            let subregion = self.subregion_after_prefix(province, &key, prefix_len);
            return match subregion {
                Some(sub_ref) => Some(Resolved {
                    province: sub_ref.province,
                    subregion: Some(sub_ref),
                }),
                None => Some(Resolved {
                    province,
                    subregion: None,
                }),
            };
        }

        if let Some(province) = self.table.province_by_stripped_key(&key) {
            return Some(Resolved {
                province,
                subregion: None,
            });
        }

        self.table
            .subregion_by_key(&key)
            .or_else(|| self.table.subregion_by_stripped_key(&key))
            .map(|sub_ref| Resolved {
                province: sub_ref.province,
                subregion: Some(sub_ref),
            })
    }

    fn to_match(&self, resolved: Resolved) -> RegionMatch {
        let province = self
            .table
            .province(resolved.province)
            .map(|p| p.name.clone())
            .unwrap_or_default();
        let subregion = resolved
            .subregion
            .and_then(|sub_ref| self.table.subregion(sub_ref))
            .map(|s| s.name.clone());
        RegionMatch {
            province,
            subregion,
        }
    }

    fn province_of_key(&self, key: &str) -> Option<usize> {
        if key.is_empty() {
            return None;
        }
        self.table
            .province_prefix(key)
            .map(|(idx, _)| idx)
            .or_else(|| self.table.subregion_by_key(key).map(|r| r.province))
            .or_else(|| self.table.subregion_by_stripped_key(key).map(|r| r.province))
    }

    fn subregion_of_key(&self, key: &str) -> Option<SubregionRef> {
        let province = self.province_of_key(key)?;
        match self.table.province_prefix(key) {
            Some((prefixed, prefix_len)) if prefixed == province => {
                self.subregion_after_prefix(province, key, prefix_len)
            }
            _ => self.table.subregion_in_province(province, key),
        }
    }

    /// Look up what follows a province prefix, then the whole key
    ///
    /// "Jeju City" folds to `jejucity`: the remainder `city` is no subregion,
    /// but the whole key is one of Jeju's. A whole key naming a unique
    /// subregion elsewhere wins over the bare province.
    fn subregion_after_prefix(
        &self,
        province: usize,
        key: &str,
        prefix_len: usize,
    ) -> Option<SubregionRef> {
        let remainder = &key[prefix_len..];
        if remainder.is_empty() {
            return None;
        }
        self.table
            .subregion_in_province(province, remainder)
            .or_else(|| self.table.subregion_in_province(province, key))
            .or_else(|| self.table.subregion_by_key(key))
    }
}
