//! Tracing / logging initialisation.

use std::collections::BTreeMap;
use std::env;

use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Variable holding the global level (or a full filter directive).
pub const LOG_ENV: &str = "CHAINDISPATCH_LOG";
/// Set to `1` or `true` for JSON log lines.
pub const LOG_JSON_ENV: &str = "CHAINDISPATCH_LOG_JSON";

/// Log level per component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Global default level: "trace" | "debug" | "info" | "warn" | "error"
    #[serde(default = "default_level")]
    pub level: String,
    /// Per-component override: crate name → level
    #[serde(default)]
    pub components: BTreeMap<String, String>,
    /// Emit JSON structured logs instead of human-readable text
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String {
    "warn".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            components: BTreeMap::new(),
            json: false,
        }
    }
}

impl LogConfig {
    /// Read `CHAINDISPATCH_LOG` / `CHAINDISPATCH_LOG_JSON`.
    pub fn from_env() -> Self {
        Self::from_vars(env::var(LOG_ENV).ok(), env::var(LOG_JSON_ENV).ok())
    }

    fn from_vars(level: Option<String>, json: Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(level) = level.filter(|l| !l.trim().is_empty()) {
            config.level = level.trim().to_string();
        }
        config.json = json.is_some_and(|v| matches!(v.trim(), "1" | "true" | "yes"));
        config
    }

    /// Filter directive string, e.g. `warn,chaindispatch_http=debug`.
    pub fn directives(&self) -> String {
        let mut directives = self.level.clone();
        for (component, level) in &self.components {
            directives.push_str(&format!(",{}={}", component.replace('-', "_"), level));
        }
        directives
    }
}

/// Install the global subscriber. Logs go to stderr so stdout stays
/// machine-readable. `RUST_LOG`, when set, replaces the configured filter.
pub fn init_tracing(config: &LogConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.directives()))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    if config.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_warn_text() {
        let cfg = LogConfig::from_vars(None, None);
        assert_eq!(cfg, LogConfig::default());
        assert_eq!(cfg.directives(), "warn");
    }

    #[test]
    fn env_values_are_applied() {
        let cfg = LogConfig::from_vars(Some(" debug ".into()), Some("true".into()));
        assert_eq!(cfg.level, "debug");
        assert!(cfg.json);

        let blank = LogConfig::from_vars(Some("".into()), Some("0".into()));
        assert_eq!(blank.level, "warn");
        assert!(!blank.json);
    }

    #[test]
    fn component_overrides_use_crate_names() {
        let mut cfg = LogConfig::default();
        cfg.components.insert("chaindispatch-http".into(), "debug".into());
        cfg.components.insert("chaindispatch-core".into(), "trace".into());
        assert_eq!(
            cfg.directives(),
            "warn,chaindispatch_core=trace,chaindispatch_http=debug"
        );
    }

    #[test]
    fn config_from_json() {
        let cfg: LogConfig = serde_json::from_str(r#"{"components": {"chaindispatch": "info"}}"#).unwrap();
        assert_eq!(cfg.level, "warn");
        assert_eq!(cfg.directives(), "warn,chaindispatch=info");
    }
}
