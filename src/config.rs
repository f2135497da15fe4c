use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::core::RecommenderOptions;
use crate::models::{ScoringProfile, ScoringWeights};
use crate::region::ExpansionWeights;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub data: DataSettings,
    #[serde(default)]
    pub engine: EngineSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }

#[derive(Debug, Clone, Deserialize)]
pub struct DataSettings {
    /// JSON snapshot with `jobs` and `attractions` arrays
    #[serde(default = "default_candidates_path")]
    pub candidates_path: String,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            candidates_path: default_candidates_path(),
        }
    }
}

fn default_candidates_path() -> String { "data/candidates.json".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct EngineSettings {
    #[serde(default = "default_min_results")]
    pub min_results_before_expanding: usize,
    #[serde(default = "default_true")]
    pub closest_match_fallback: bool,
    #[serde(default)]
    pub fallback_region_weight: f64,
    pub similarity_floor: Option<f64>,
    #[serde(default = "default_keyword_increment")]
    pub keyword_increment: f64,
    #[serde(default = "default_target_count")]
    pub default_target_count: usize,
    #[serde(default = "default_max_target_count")]
    pub max_target_count: usize,
    #[serde(default)]
    pub expansion: ExpansionSettings,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            min_results_before_expanding: default_min_results(),
            closest_match_fallback: true,
            fallback_region_weight: 0.0,
            similarity_floor: None,
            keyword_increment: default_keyword_increment(),
            default_target_count: default_target_count(),
            max_target_count: default_max_target_count(),
            expansion: ExpansionSettings::default(),
        }
    }
}

impl EngineSettings {
    pub fn recommender_options(&self) -> RecommenderOptions {
        RecommenderOptions {
            min_results_before_expanding: self.min_results_before_expanding,
            closest_match_fallback: self.closest_match_fallback,
            fallback_region_weight: self.fallback_region_weight.clamp(0.0, 1.0),
            similarity_floor: self.similarity_floor,
        }
    }
}

fn default_min_results() -> usize { 5 }
fn default_true() -> bool { true }
fn default_keyword_increment() -> f64 { 0.2 }
fn default_target_count() -> usize { 10 }
fn default_max_target_count() -> usize { 100 }

#[derive(Debug, Clone, Deserialize)]
pub struct ExpansionSettings {
    #[serde(default = "default_alias_weight")]
    pub alias: f64,
    #[serde(default = "default_province_with_subregion_weight")]
    pub province_with_subregion: f64,
    #[serde(default = "default_province_only_weight")]
    pub province_only: f64,
    #[serde(default = "default_adjacent_weight")]
    pub adjacent: f64,
}

impl Default for ExpansionSettings {
    fn default() -> Self {
        Self {
            alias: default_alias_weight(),
            province_with_subregion: default_province_with_subregion_weight(),
            province_only: default_province_only_weight(),
            adjacent: default_adjacent_weight(),
        }
    }
}

impl From<&ExpansionSettings> for ExpansionWeights {
    fn from(settings: &ExpansionSettings) -> Self {
        ExpansionWeights {
            alias: settings.alias,
            province_with_subregion: settings.province_with_subregion,
            province_only: settings.province_only,
            adjacent: settings.adjacent,
        }
    }
}

fn default_alias_weight() -> f64 { 0.9 }
fn default_province_with_subregion_weight() -> f64 { 0.7 }
fn default_province_only_weight() -> f64 { 0.9 }
fn default_adjacent_weight() -> f64 { 0.4 }

#[derive(Debug, Clone, Deserialize)]
pub struct ScoringSettings {
    #[serde(default = "default_job_profile")]
    pub job: ProfileConfig,
    #[serde(default = "default_attraction_profile")]
    pub attraction: ProfileConfig,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            job: default_job_profile(),
            attraction: default_attraction_profile(),
        }
    }
}

impl ScoringSettings {
    pub fn weights(&self) -> ScoringWeights {
        ScoringWeights {
            job: self.job.into(),
            attraction: self.attraction.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ProfileConfig {
    pub vector: f64,
    pub region: f64,
    pub keyword: f64,
}

impl From<ProfileConfig> for ScoringProfile {
    fn from(config: ProfileConfig) -> Self {
        ScoringProfile {
            vector: config.vector,
            region: config.region,
            keyword: config.keyword,
        }
    }
}

fn default_job_profile() -> ProfileConfig {
    ProfileConfig { vector: 0.70, region: 0.25, keyword: 0.05 }
}

fn default_attraction_profile() -> ProfileConfig {
    ProfileConfig { vector: 0.60, region: 0.20, keyword: 0.20 }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "compact".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with RURAL__)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., RURAL__ENGINE__MIN_RESULTS_BEFORE_EXPANDING -> engine.min_results_before_expanding
            .add_source(
                Environment::with_prefix("RURAL")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings = apply_env_overrides(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("RURAL")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// Short-form variables used by container deployments
///
/// `CANDIDATES_PATH` and `PORT` win over every other source.
fn apply_env_overrides(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(path) = env::var("CANDIDATES_PATH") {
        builder = builder.set_override("data.candidates_path", path)?;
    }
    if let Some(port) = env::var("PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
        builder = builder.set_override("server.port", i64::from(port))?;
    }

    builder.build()
}
