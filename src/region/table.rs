use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

const BUNDLED_TABLE: &str = include_str!("../../data/regions.toml");

/// Administrative suffixes removed by the stripping fallback, longest first
const ADMIN_SUFFIXES: &[&str] = &[
    "specialselfgoverningprovince",
    "specialselfgoverningcity",
    "metropolitancity",
    "specialcity",
    "province",
    "county",
    "district",
    "state",
    "city",
    "gun",
    "si",
    "gu",
    "do",
    "특별자치도",
    "특별자치시",
    "광역시",
    "특별시",
    "도",
    "시",
    "군",
    "구",
];

#[derive(Debug, Error)]
pub enum RegionTableError {
    #[error("Failed to parse region table: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Province {province} lists unknown neighbor {neighbor}")]
    UnknownNeighbor { province: String, neighbor: String },

    #[error("Province {0} lists itself as a neighbor")]
    SelfNeighbor(String),

    #[error("Region table contains an entry with an empty name")]
    EmptyName,

    #[error("Alias {alias} is claimed by provinces {first} and {second}")]
    DuplicateProvinceAlias {
        alias: String,
        first: String,
        second: String,
    },
}

#[derive(Debug, Deserialize)]
struct RegionTableFile {
    #[serde(default)]
    generic_terms: Vec<String>,
    #[serde(default, rename = "province")]
    provinces: Vec<ProvinceEntry>,
}

/// Top-level administrative unit (do / metropolitan city)
#[derive(Debug, Clone, Deserialize)]
pub struct ProvinceEntry {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub neighbors: Vec<String>,
    #[serde(default, rename = "subregion")]
    pub subregions: Vec<SubregionEntry>,
}

/// Second-level unit (si / gun / gu)
#[derive(Debug, Clone, Deserialize)]
pub struct SubregionEntry {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// Position of a subregion inside the table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubregionRef {
    pub province: usize,
    pub subregion: usize,
}

/// Immutable lookup table of provinces, subregions, aliases and adjacency
///
/// Every key is folded with [`fold_key`]. A second set of indexes holds the
/// keys with one administrative suffix removed ([`strip_admin_suffix`]).
#[derive(Debug, Clone)]
pub struct RegionTable {
    provinces: Vec<ProvinceEntry>,
    neighbors: Vec<Vec<usize>>,
    generic_terms: HashSet<String>,
    province_keys: HashMap<String, usize>,
    province_stripped: HashMap<String, Vec<usize>>,
    /// Exact province keys, longest first, for prefix decomposition
    province_prefixes: Vec<(String, usize)>,
    subregion_keys: HashMap<String, Vec<SubregionRef>>,
    subregion_stripped: HashMap<String, Vec<SubregionRef>>,
}

impl RegionTable {
    /// Parse the table compiled into the binary
    pub fn bundled() -> Result<Self, RegionTableError> {
        Self::from_toml_str(BUNDLED_TABLE)
    }

    pub fn from_toml_str(source: &str) -> Result<Self, RegionTableError> {
        let file: RegionTableFile = toml::from_str(source)?;
        Self::build(file)
    }

    fn build(file: RegionTableFile) -> Result<Self, RegionTableError> {
        let mut province_keys: HashMap<String, usize> = HashMap::new();
        let mut province_stripped: HashMap<String, Vec<usize>> = HashMap::new();
        let mut subregion_keys: HashMap<String, Vec<SubregionRef>> = HashMap::new();
        let mut subregion_stripped: HashMap<String, Vec<SubregionRef>> = HashMap::new();

        for (p_idx, province) in file.provinces.iter().enumerate() {
            if fold_key(&province.name).is_empty() {
                return Err(RegionTableError::EmptyName);
            }

            for term in std::iter::once(&province.name).chain(province.aliases.iter()) {
                let key = fold_key(term);
                if key.is_empty() {
                    continue;
                }
                if let Some(&other) = province_keys.get(&key) {
                    if other != p_idx {
                        return Err(RegionTableError::DuplicateProvinceAlias {
                            alias: term.clone(),
                            first: file.provinces[other].name.clone(),
                            second: province.name.clone(),
                        });
                    }
                }
                province_keys.insert(key.clone(), p_idx);
                push_unique(&mut province_stripped, strip_admin_suffix(&key), p_idx);
            }

            for (s_idx, subregion) in province.subregions.iter().enumerate() {
                if fold_key(&subregion.name).is_empty() {
                    return Err(RegionTableError::EmptyName);
                }
                let sub_ref = SubregionRef {
                    province: p_idx,
                    subregion: s_idx,
                };
                for term in std::iter::once(&subregion.name).chain(subregion.aliases.iter()) {
                    let key = fold_key(term);
                    if key.is_empty() {
                        continue;
                    }
                    push_unique(&mut subregion_stripped, strip_admin_suffix(&key), sub_ref);
                    push_unique(&mut subregion_keys, key, sub_ref);
                }
            }
        }

        let mut neighbors = Vec::with_capacity(file.provinces.len());
        for (p_idx, province) in file.provinces.iter().enumerate() {
            let mut resolved = Vec::with_capacity(province.neighbors.len());
            for neighbor in &province.neighbors {
                let n_idx = province_keys.get(&fold_key(neighbor)).copied().ok_or_else(|| {
                    RegionTableError::UnknownNeighbor {
                        province: province.name.clone(),
                        neighbor: neighbor.clone(),
                    }
                })?;
                if n_idx == p_idx {
                    return Err(RegionTableError::SelfNeighbor(province.name.clone()));
                }
                if !resolved.contains(&n_idx) {
                    resolved.push(n_idx);
                }
            }
            neighbors.push(resolved);
        }

        let mut province_prefixes: Vec<(String, usize)> = province_keys
            .iter()
            .filter(|(key, _)| key.chars().count() >= 2)
            .map(|(key, idx)| (key.clone(), *idx))
            .collect();
        province_prefixes.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));

        let generic_terms = file
            .generic_terms
            .iter()
            .map(|term| fold_key(term))
            .filter(|key| !key.is_empty())
            .collect();

        Ok(Self {
            provinces: file.provinces,
            neighbors,
            generic_terms,
            province_keys,
            province_stripped,
            province_prefixes,
            subregion_keys,
            subregion_stripped,
        })
    }

    pub fn provinces(&self) -> &[ProvinceEntry] {
        &self.provinces
    }

    pub fn province(&self, idx: usize) -> Option<&ProvinceEntry> {
        self.provinces.get(idx)
    }

    pub fn subregion(&self, sub_ref: SubregionRef) -> Option<&SubregionEntry> {
        self.provinces
            .get(sub_ref.province)
            .and_then(|p| p.subregions.get(sub_ref.subregion))
    }

    /// True for "anywhere"-style terms such as `nationwide` or `전국`
    pub fn is_generic(&self, term: &str) -> bool {
        self.generic_terms.contains(&fold_key(term))
    }

    /// Exact province lookup of a folded key
    pub fn province_by_key(&self, key: &str) -> Option<usize> {
        self.province_keys.get(key).copied()
    }

    /// Province lookup after suffix stripping; ambiguous keys never resolve
    pub fn province_by_stripped_key(&self, key: &str) -> Option<usize> {
        let stripped = strip_admin_suffix(key);
        self.province_keys
            .get(&stripped)
            .copied()
            .or_else(|| unique(self.province_stripped.get(&stripped)))
    }

    /// Longest province key that prefixes `key`, with the prefix length in bytes
    pub fn province_prefix(&self, key: &str) -> Option<(usize, usize)> {
        self.province_prefixes
            .iter()
            .find(|(prefix, _)| key.starts_with(prefix.as_str()))
            .map(|(prefix, idx)| (*idx, prefix.len()))
    }

    /// Unique subregion anywhere in the table with this exact key
    pub fn subregion_by_key(&self, key: &str) -> Option<SubregionRef> {
        unique(self.subregion_keys.get(key))
    }

    /// Unique subregion anywhere in the table after suffix stripping
    pub fn subregion_by_stripped_key(&self, key: &str) -> Option<SubregionRef> {
        let stripped = strip_admin_suffix(key);
        unique(self.subregion_keys.get(&stripped))
            .or_else(|| unique(self.subregion_stripped.get(&stripped)))
    }

    /// Subregion of one province, exact key first, then suffix-stripped
    pub fn subregion_in_province(&self, province: usize, key: &str) -> Option<SubregionRef> {
        let in_province = |refs: Option<&Vec<SubregionRef>>| {
            refs.and_then(|refs| refs.iter().find(|r| r.province == province).copied())
        };

        in_province(self.subregion_keys.get(key)).or_else(|| {
            let stripped = strip_admin_suffix(key);
            in_province(self.subregion_keys.get(&stripped))
                .or_else(|| in_province(self.subregion_stripped.get(&stripped)))
        })
    }

    pub fn neighbors(&self, province: usize) -> &[usize] {
        self.neighbors.get(province).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Canonical name followed by every alias of a province
    pub fn province_patterns(&self, province: usize) -> Vec<String> {
        self.province(province)
            .map(|p| names_of(&p.name, &p.aliases))
            .unwrap_or_default()
    }

    /// Canonical name followed by every alias of a subregion
    pub fn subregion_patterns(&self, sub_ref: SubregionRef) -> Vec<String> {
        self.subregion(sub_ref)
            .map(|s| names_of(&s.name, &s.aliases))
            .unwrap_or_default()
    }
}

fn names_of(name: &str, aliases: &[String]) -> Vec<String> {
    std::iter::once(name.to_string())
        .chain(aliases.iter().cloned())
        .collect()
}

fn push_unique<T: PartialEq>(index: &mut HashMap<String, Vec<T>>, key: String, value: T) {
    let entries = index.entry(key).or_default();
    if !entries.contains(&value) {
        entries.push(value);
    }
}

fn unique<T: Copy>(entries: Option<&Vec<T>>) -> Option<T> {
    match entries.map(Vec::as_slice) {
        Some([only]) => Some(*only),
        _ => None,
    }
}

/// Case-insensitive lookup key: lowercase, without whitespace, `-`, `_`, `.`, `,`
pub fn fold_key(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '_' | '.' | ','))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Remove one administrative suffix from a folded key
///
/// The suffix is only removed when at least two characters remain, so `중구`
/// and `gu` stay as they are.
pub fn strip_admin_suffix(key: &str) -> String {
    for suffix in ADMIN_SUFFIXES {
        if let Some(stem) = key.strip_suffix(suffix) {
            if stem.chars().count() >= 2 {
                return stem.to_string();
            }
        }
    }
    key.to_string()
}
