//! Configuration (spec §6, SPEC_FULL.md §10.3)
//!
//! Trimmed from the teacher's large multi-section `Config` down to the
//! gateway's actual shape: which providers to connect, their settings, and
//! a small ambient-logging/timeouts block. Loaded the same way — `figment`
//! layering a YAML file under `MCP_GATEWAY_`-prefixed environment
//! variables, with the teacher's `~`-expanding `.env` loader kept verbatim.

use std::collections::HashMap;
use std::env;
use std::path::Path;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

/// Top-level gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// `.env` files to load before resolving the rest of config. Paths
    /// support `~` expansion. Loaded in order, later files override earlier.
    #[serde(default)]
    pub env_files: Vec<String>,
    /// Provider names to connect at startup, in connection order.
    #[serde(default)]
    pub enabled_providers: Vec<String>,
    /// Per-provider config fragments, keyed by provider name.
    #[serde(default)]
    pub provider_settings: HashMap<String, Value>,
    /// Ambient engineering settings (logging, timeouts).
    #[serde(default)]
    pub global_settings: GlobalSettings,
}

/// Ambient settings shared by every part of the gateway.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GlobalSettings {
    /// Logging configuration (SPEC_FULL.md §10.1).
    pub logging: LoggingConfig,
    /// Default timeouts applied where a provider doesn't override them.
    pub timeouts: TimeoutsConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `trace`/`debug`/`info`/`warn`/`error`, or a full `tracing` filter
    /// directive (e.g. `mcp_gateway=debug,warn`).
    pub level: String,
    /// `text` (human-readable) or `json` (structured).
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

/// Default timeouts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutsConfig {
    /// Per-request timeout applied by [`crate::client::ClientDemux`] when a
    /// provider doesn't specify its own.
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            request_timeout: crate::client::DEFAULT_TIMEOUT,
        }
    }
}

impl Config {
    /// Load configuration from an optional YAML file, layered under
    /// `MCP_GATEWAY_`-prefixed environment variables (`__` nests keys, e.g.
    /// `MCP_GATEWAY_PROVIDER_SETTINGS__JIRA__TOKEN`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if `path` is given but doesn't
    /// exist, or if the merged configuration doesn't parse.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new();

        if let Some(p) = path {
            if !p.exists() {
                return Err(Error::Configuration(format!(
                    "config file not found: {}",
                    p.display()
                )));
            }
            figment = figment.merge(Yaml::file(p));
        }

        figment = figment.merge(Env::prefixed("MCP_GATEWAY_").split("__"));

        let config: Self = figment
            .extract()
            .map_err(|e| Error::Configuration(e.to_string()))?;

        config.load_env_files();
        Ok(config)
    }

    /// Load `env_files` into the process environment. Supports `~`
    /// expansion. Missing files are logged and skipped, not an error.
    fn load_env_files(&self) {
        for path_str in &self.env_files {
            let expanded = if let Some(rest) = path_str.strip_prefix('~') {
                dirs::home_dir().map_or_else(|| path_str.clone(), |home| format!("{}{rest}", home.display()))
            } else {
                path_str.clone()
            };

            let path = Path::new(&expanded);
            if path.exists() {
                match dotenvy::from_path(path) {
                    Ok(()) => tracing::info!(path = %expanded, "loaded env file"),
                    Err(e) => tracing::warn!(path = %expanded, error = %e, "failed to load env file"),
                }
            } else {
                tracing::debug!(path = %expanded, "env file not found, skipped");
            }
        }
    }

    /// The config fragment for `provider_name`, or an empty object if none
    /// was declared.
    #[must_use]
    pub fn provider_config(&self, provider_name: &str) -> Value {
        self.provider_settings
            .get(provider_name)
            .cloned()
            .unwrap_or_else(|| serde_json::json!({}))
    }
}

/// Humantime-style duration (de)serialization (`"30s"`, `"5m"`, `"250ms"`).
pub mod humantime_serde {
    use std::time::Duration;

    use serde::{self, Deserialize, Deserializer, Serializer};

    /// Serialize as a whole-second suffixed string.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the serializer fails.
    pub fn serialize<S>(duration: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{}s", duration.as_secs()))
    }

    /// Parse `"30s"`, `"5m"`, `"250ms"`, or a bare integer (seconds).
    ///
    /// # Errors
    ///
    /// Returns a deserialization error if the string doesn't parse.
    pub fn deserialize<'de, D>(deserializer: D) -> std::result::Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        if let Some(secs) = s.strip_suffix("ms") {
            return secs
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(serde::de::Error::custom);
        }
        if let Some(secs) = s.strip_suffix('s') {
            return secs
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(serde::de::Error::custom);
        }
        if let Some(mins) = s.strip_suffix('m') {
            return mins
                .parse::<u64>()
                .map(|m| Duration::from_secs(m * 60))
                .map_err(serde::de::Error::custom);
        }
        s.parse::<u64>()
            .map(Duration::from_secs)
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn load_env_files_sets_env_vars() {
        let dir = tempfile::tempdir().unwrap();
        let env_path = dir.path().join("test.env");
        let mut f = std::fs::File::create(&env_path).unwrap();
        writeln!(f, "MCP_GW_TEST_REGISTRY_TOKEN=hello").unwrap();
        drop(f);

        let config = Config {
            env_files: vec![env_path.to_string_lossy().to_string()],
            ..Default::default()
        };
        config.load_env_files();
        assert_eq!(env::var("MCP_GW_TEST_REGISTRY_TOKEN").unwrap(), "hello");
    }

    #[test]
    fn load_env_files_skips_missing_without_panicking() {
        let config = Config {
            env_files: vec!["/nonexistent/path/.env".to_string()],
            ..Default::default()
        };
        config.load_env_files();
    }

    #[test]
    fn deserializes_enabled_providers_and_settings_from_yaml() {
        let yaml = r"
enabled_providers:
  - jira
  - confluence
provider_settings:
  jira:
    command: [mcp-server-jira]
    endpoint: https://example.atlassian.net
";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.enabled_providers, vec!["jira", "confluence"]);
        assert_eq!(config.provider_config("jira")["endpoint"], "https://example.atlassian.net");
        assert_eq!(config.provider_config("missing"), serde_json::json!({}));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = Config::load(Some(Path::new("/nonexistent/config.yaml"))).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }
}
