const SETTINGS_PATH: &str = "src/default_settings.toml";

/// Keys `settings::parse_settings_toml` requires, by section.
const REQUIRED: &[(&str, &[&str])] = &[
    ("index", &["max_phrase_chars"]),
    (
        "search",
        &[
            "min_word_length",
            "default_max_suggestions",
            "fuzzy_max_distance",
            "fuzzy_distance_cap",
            "fuzzy_candidate_factor",
            "fuzzy_max_visits",
        ],
    ),
    ("segment", &["min_key_chars", "cjk_window_min", "cjk_window_max"]),
    ("cache", &["contains_capacity", "suggest_capacity"]),
];

fn main() {
    println!("cargo:rerun-if-changed={SETTINGS_PATH}");
    check_settings(include_str!("src/default_settings.toml"));
}

fn check_settings(content: &str) {
    let value: toml::Value = match content.parse() {
        Ok(v) => v,
        Err(e) => panic!("{SETTINGS_PATH} contains invalid TOML: {e}"),
    };
    for (section, keys) in REQUIRED {
        let Some(table) = value.get(section).and_then(|v| v.as_table()) else {
            panic!("{SETTINGS_PATH}: missing [{section}]");
        };
        for key in *keys {
            match table.get(*key).and_then(|v| v.as_integer()) {
                Some(n) if n >= 0 => {}
                _ => panic!("{SETTINGS_PATH}: [{section}] {key} must be a non-negative integer"),
            }
        }
    }
}
