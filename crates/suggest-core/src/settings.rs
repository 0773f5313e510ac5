//! Global settings loaded from TOML.
//!
//! - `init_custom(toml_content)` sets a custom TOML before first `settings()` call
//! - `settings()` returns `&'static Settings` (lazy-init singleton)
//! - Default values are embedded via `include_str!("default_settings.toml")`

use std::sync::OnceLock;

use serde::Deserialize;

pub const DEFAULT_SETTINGS_TOML: &str = include_str!("default_settings.toml");

static CUSTOM_TOML: OnceLock<String> = OnceLock::new();

/// Set custom TOML before first `settings()` call.
pub fn init_custom(toml_content: String) -> Result<(), SettingsError> {
    parse_settings_toml(&toml_content)?;
    CUSTOM_TOML
        .set(toml_content)
        .map_err(|_| SettingsError::AlreadyInitialized)
}

/// Get or initialize the global settings singleton.
pub fn settings() -> &'static Settings {
    static INSTANCE: OnceLock<Settings> = OnceLock::new();
    INSTANCE.get_or_init(|| {
        let toml_str = CUSTOM_TOML
            .get()
            .map(|s| s.as_str())
            .unwrap_or(DEFAULT_SETTINGS_TOML);
        parse_settings_toml(toml_str)
            .or_else(|_| parse_settings_toml(DEFAULT_SETTINGS_TOML))
            .expect("embedded default settings are validated by build.rs")
    })
}

/// Returns the embedded default settings TOML content.
pub fn default_toml() -> &'static str {
    DEFAULT_SETTINGS_TOML
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("TOML parse error: {0}")]
    Parse(String),
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
    #[error("settings already initialized")]
    AlreadyInitialized,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub index: IndexSettings,
    pub search: SearchSettings,
    pub segment: SegmentSettings,
    pub cache: CacheSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IndexSettings {
    pub max_phrase_chars: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchSettings {
    pub min_word_length: usize,
    pub default_max_suggestions: usize,
    pub fuzzy_max_distance: usize,
    pub fuzzy_distance_cap: usize,
    pub fuzzy_candidate_factor: usize,
    pub fuzzy_max_visits: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SegmentSettings {
    pub min_key_chars: usize,
    pub cjk_window_min: usize,
    pub cjk_window_max: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    pub contains_capacity: usize,
    pub suggest_capacity: usize,
}

pub fn parse_settings_toml(toml_str: &str) -> Result<Settings, SettingsError> {
    let s: Settings = toml::from_str(toml_str).map_err(|e| SettingsError::Parse(e.to_string()))?;
    validate(&s)?;
    Ok(s)
}

fn validate(s: &Settings) -> Result<(), SettingsError> {
    macro_rules! check_positive_usize {
        ($section:ident . $field:ident) => {
            if s.$section.$field == 0 {
                return Err(SettingsError::InvalidValue {
                    field: concat!(stringify!($section), ".", stringify!($field)).to_string(),
                    reason: "must be positive".to_string(),
                });
            }
        };
    }

    check_positive_usize!(index.max_phrase_chars);

    check_positive_usize!(search.min_word_length);
    check_positive_usize!(search.default_max_suggestions);
    check_positive_usize!(search.fuzzy_candidate_factor);
    check_positive_usize!(search.fuzzy_max_visits);
    if s.search.fuzzy_max_distance > s.search.fuzzy_distance_cap {
        return Err(SettingsError::InvalidValue {
            field: "search.fuzzy_max_distance".to_string(),
            reason: "must not exceed search.fuzzy_distance_cap".to_string(),
        });
    }

    check_positive_usize!(segment.min_key_chars);
    check_positive_usize!(segment.cjk_window_min);
    if s.segment.cjk_window_max < s.segment.cjk_window_min {
        return Err(SettingsError::InvalidValue {
            field: "segment.cjk_window_max".to_string(),
            reason: "must be at least segment.cjk_window_min".to_string(),
        });
    }

    check_positive_usize!(cache.contains_capacity);
    check_positive_usize!(cache.suggest_capacity);

    Ok(())
}
