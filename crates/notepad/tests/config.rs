use std::collections::HashMap;
use std::time::Duration;

use mononote::{AUTOSAVE_ENV, AppConfig, MAX_UNDO_ENV};

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
    move |key: &str| vars.get(key).cloned()
}

#[test]
fn zero_means_default() {
    let config = AppConfig::default().with_defaults();

    assert_eq!(config.autosave_delay, Duration::from_millis(2000));
    assert_eq!(config.session_tick, Duration::from_secs(1));
    assert_eq!(config.max_undo, 200);
    assert_eq!(config.editor_config().max_undo, 200);
    assert_eq!(config.editor_config().max_normalize_iterations, 100);
}

#[test]
fn environment_overrides_defaults() {
    let config = AppConfig::from_lookup(lookup(&[(AUTOSAVE_ENV, "500"), (MAX_UNDO_ENV, " 7 ")]));

    assert_eq!(config.autosave_delay, Duration::from_millis(500));
    assert_eq!(config.max_undo, 7);
    assert_eq!(config.editor_config().max_undo, 7);
}

#[test]
fn unparsable_values_fall_back() {
    let config = AppConfig::from_lookup(lookup(&[(AUTOSAVE_ENV, "soon"), (MAX_UNDO_ENV, "0")]));

    assert_eq!(config, AppConfig::default().with_defaults());
}
