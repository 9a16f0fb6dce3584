//! aiOS firewall reconciler configuration

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "/etc/aios/firewall.toml";
pub const CONFIG_ENV: &str = "AIOS_FIREWALL_CONFIG";

/// Root configuration structure
#[derive(Debug, Default, Deserialize)]
pub struct FirewallConfig {
    #[serde(default)]
    pub firewall: EngineConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_executable")]
    pub executable: String,
    #[serde(default)]
    pub query_failure: QueryFailurePolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            executable: default_executable(),
            query_failure: QueryFailurePolicy::default(),
        }
    }
}

/// What to do when a listing command cannot be trusted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryFailurePolicy {
    /// Treat the object as not present and carry on
    #[default]
    AssumeAbsent,
    /// Stop and report a failed result
    Fail,
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

fn default_executable() -> String { "firewall-cmd".into() }
fn default_log_level() -> String { "info".into() }

/// Where the active configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(String),
    /// No file at this path; built-in defaults are in effect
    Defaults(String),
}

impl ConfigSource {
    /// Report the source. Call once a subscriber is installed, since a
    /// missing file silently reverts every setting to its default.
    pub fn log(&self) {
        match self {
            ConfigSource::File(path) => tracing::debug!("Loaded config from {path}"),
            ConfigSource::Defaults(path) => {
                tracing::warn!("Config file not found at {path}, using defaults")
            }
        }
    }
}

/// Load configuration from `path`, `$AIOS_FIREWALL_CONFIG`, or /etc/aios/firewall.toml
pub fn load_config(path: Option<&str>) -> Result<(FirewallConfig, ConfigSource)> {
    let config_path = match path {
        Some(p) => p.to_string(),
        None => std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string()),
    };

    if Path::new(&config_path).exists() {
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config from {config_path}"))?;
        let config: FirewallConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {config_path}"))?;
        Ok((config, ConfigSource::File(config_path)))
    } else {
        Ok((FirewallConfig::default(), ConfigSource::Defaults(config_path)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_default_config() {
        let config = FirewallConfig::default();
        assert_eq!(config.firewall.executable, "firewall-cmd");
        assert_eq!(config.firewall.query_failure, QueryFailurePolicy::AssumeAbsent);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Compact);
    }

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
[firewall]
executable = "/usr/bin/firewall-cmd"
query_failure = "fail"

[logging]
level = "debug"
format = "json"
"#;
        let config: FirewallConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.firewall.executable, "/usr/bin/firewall-cmd");
        assert_eq!(config.firewall.query_failure, QueryFailurePolicy::Fail);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_parse_partial_config() {
        let config: FirewallConfig = toml::from_str("[logging]\nlevel = \"warn\"\n").unwrap();
        assert_eq!(config.firewall.executable, "firewall-cmd");
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_unknown_policy_rejected() {
        let result: Result<FirewallConfig, _> =
            toml::from_str("[firewall]\nquery_failure = \"retry\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[firewall]\nexecutable = \"/opt/fw\"").unwrap();

        let (config, source) = load_config(file.path().to_str()).unwrap();
        assert_eq!(config.firewall.executable, "/opt/fw");
        assert!(matches!(source, ConfigSource::File(_)));
    }

    #[test]
    fn test_load_config_missing_uses_defaults() {
        let (config, source) = load_config(Some("/nonexistent/aios/firewall.toml")).unwrap();
        assert_eq!(config.firewall.executable, "firewall-cmd");
        assert_eq!(
            source,
            ConfigSource::Defaults("/nonexistent/aios/firewall.toml".into())
        );
    }

    /// Collects formatted log output for assertions
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_missing_config_warns() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let (_, source) = load_config(Some("/nonexistent/aios/typo.toml")).unwrap();
            source.log();
        });

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("WARN"), "{output}");
        assert!(
            output.contains("Config file not found at /nonexistent/aios/typo.toml"),
            "{output}"
        );
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[firewall\nexecutable = ").unwrap();
        assert!(load_config(file.path().to_str()).is_err());
    }
}
