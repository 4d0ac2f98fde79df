use std::time::Duration;

use mononote_core::EditorConfig;

pub const AUTOSAVE_ENV: &str = "MONONOTE_AUTOSAVE_MS";
pub const MAX_UNDO_ENV: &str = "MONONOTE_MAX_UNDO";

const DEFAULT_AUTOSAVE: Duration = Duration::from_millis(2000);
const DEFAULT_SESSION_TICK: Duration = Duration::from_secs(1);
const DEFAULT_MAX_UNDO: usize = 200;

/// Zero durations and counts mean "use the default", as with [`EditorConfig`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    pub autosave_delay: Duration,
    pub session_tick: Duration,
    pub max_undo: usize,
}

impl AppConfig {
    pub fn with_defaults(mut self) -> Self {
        if self.autosave_delay.is_zero() {
            self.autosave_delay = DEFAULT_AUTOSAVE;
        }
        if self.session_tick.is_zero() {
            self.session_tick = DEFAULT_SESSION_TICK;
        }
        if self.max_undo == 0 {
            self.max_undo = DEFAULT_MAX_UNDO;
        }
        self
    }

    /// Defaults overridden by `MONONOTE_AUTOSAVE_MS` / `MONONOTE_MAX_UNDO`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(ms) = parse_var(&lookup, AUTOSAVE_ENV) {
            config.autosave_delay = Duration::from_millis(ms);
        }
        if let Some(max_undo) = parse_var(&lookup, MAX_UNDO_ENV) {
            config.max_undo = max_undo as usize;
        }
        config.with_defaults()
    }

    pub fn editor_config(&self) -> EditorConfig {
        EditorConfig {
            max_undo: self.max_undo,
            ..EditorConfig::default()
        }
        .with_defaults()
    }
}

fn parse_var(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<u64> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!("ignoring {key}={raw:?}: {err}");
            None
        }
    }
}
