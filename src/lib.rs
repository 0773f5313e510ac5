pub mod engine;
pub mod trace_init;

pub use engine::{EngineError, EngineStats, SuggestEngine};
pub use suggest_core::{
    AutocompleteIndex, IndexStats, LoadOutcome, LoadPolicy, MatchType, PersistError,
    PhraseFrequency, Suggestion,
};

use std::path::Path;

pub fn engine_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Install settings from a TOML file. Must run before the first engine is
/// created; later calls fail with `AlreadyInitialized`.
pub fn settings_load_config(path: &Path) -> Result<(), EngineError> {
    let content = std::fs::read_to_string(path)?;
    suggest_core::settings::init_custom(content)?;
    Ok(())
}

pub fn settings_default_config() -> &'static str {
    suggest_core::settings::default_toml()
}

pub fn trace_init(log_dir: &Path) {
    trace_init::init_tracing(log_dir);
}
