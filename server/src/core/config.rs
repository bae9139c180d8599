use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use super::cli::CliConfig;
use super::constants::{
    CONFIG_FILE_NAME, DEFAULT_ATTRIBUTE_NAME, DEFAULT_DATABASE_NAME, DEFAULT_EXPORTER_ENDPOINT,
    DEFAULT_EXPORTER_TIMEOUT_SECS, DEFAULT_HOST, DEFAULT_MAX_PLAN_DEPTH, DEFAULT_PORT,
};

// =============================================================================
// Resolved Configuration
// =============================================================================

/// Fully resolved application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub exporter: ExporterConfig,
    pub connector: ConnectorConfig,
}

/// HTTP server settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Downstream trace delivery settings
#[derive(Debug, Clone)]
pub struct ExporterConfig {
    pub endpoint: String,
    pub timeout_secs: u64,
}

/// Plan-to-trace conversion settings
#[derive(Debug, Clone)]
pub struct ConnectorConfig {
    /// Attribute key consumed by the sibling trace-to-metric direction.
    /// Validated here; not read by the log-to-trace path itself.
    pub attribute_name: String,
    /// Bound on plan tree nesting; deeper records are skipped.
    pub max_plan_depth: usize,
    /// Reported as `db.name` and `service.name` on emitted resources.
    pub database_name: String,
}

// =============================================================================
// File Configuration (JSON)
// =============================================================================

#[derive(Debug, Default, Clone, Deserialize)]
struct ServerFileConfig {
    host: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Default, Clone, Deserialize)]
struct ExporterFileConfig {
    endpoint: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Clone, Deserialize)]
struct ConnectorFileConfig {
    attribute_name: Option<String>,
    max_plan_depth: Option<usize>,
    database_name: Option<String>,
}

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    server: Option<ServerFileConfig>,
    exporter: Option<ExporterFileConfig>,
    connector: Option<ConnectorFileConfig>,
    #[serde(flatten)]
    extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        if let serde_json::Value::Object(map) = &self.extra
            && !map.is_empty()
        {
            let keys_str: String = map
                .keys()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::warn!(
                fields = %keys_str,
                "Unknown fields in config file (possible typos)"
            );
        }
    }
}

// =============================================================================
// Loading and Validation
// =============================================================================

impl AppConfig {
    /// Load and validate configuration.
    ///
    /// Layering (later wins):
    /// 1. Built-in defaults
    /// 2. JSON config file (local `pgbridge.json` or `--config` path)
    /// 3. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");

        let file_path = if let Some(ref path) = cli.config {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            Some(path.clone())
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        let file_config = match file_path {
            Some(path) => {
                let config = FileConfig::load_from_file(&path)?;
                config.warn_unknown_fields();
                config
            }
            None => FileConfig::default(),
        };

        let config = Self::resolve(cli, file_config);
        config.validate()?;
        Ok(config)
    }

    /// Layer defaults, file config, and CLI/env overrides
    fn resolve(cli: &CliConfig, file: FileConfig) -> Self {
        let file_server = file.server.unwrap_or_default();
        let file_exporter = file.exporter.unwrap_or_default();
        let file_connector = file.connector.unwrap_or_default();

        let server = ServerConfig {
            host: cli
                .host
                .clone()
                .or(file_server.host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: cli.port.or(file_server.port).unwrap_or(DEFAULT_PORT),
        };

        let exporter = ExporterConfig {
            endpoint: cli
                .exporter_endpoint
                .clone()
                .or(file_exporter.endpoint)
                .unwrap_or_else(|| DEFAULT_EXPORTER_ENDPOINT.to_string()),
            timeout_secs: cli
                .exporter_timeout_secs
                .or(file_exporter.timeout_secs)
                .unwrap_or(DEFAULT_EXPORTER_TIMEOUT_SECS),
        };

        let connector = ConnectorConfig {
            attribute_name: cli
                .attribute_name
                .clone()
                .or(file_connector.attribute_name)
                .unwrap_or_else(|| DEFAULT_ATTRIBUTE_NAME.to_string()),
            max_plan_depth: cli
                .max_plan_depth
                .or(file_connector.max_plan_depth)
                .unwrap_or(DEFAULT_MAX_PLAN_DEPTH),
            database_name: cli
                .database_name
                .clone()
                .or(file_connector.database_name)
                .unwrap_or_else(|| DEFAULT_DATABASE_NAME.to_string()),
        };

        Self {
            server,
            exporter,
            connector,
        }
    }

    /// Reject configurations the connector cannot run with
    fn validate(&self) -> Result<()> {
        if self.connector.attribute_name.is_empty() {
            anyhow::bail!("connector.attribute_name must not be empty");
        }
        if self.connector.max_plan_depth == 0 {
            anyhow::bail!("connector.max_plan_depth must be at least 1");
        }
        if !self.exporter.endpoint.starts_with("http://")
            && !self.exporter.endpoint.starts_with("https://")
        {
            anyhow::bail!(
                "exporter.endpoint must be an http(s) URL, got '{}'",
                self.exporter.endpoint
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults_when_no_file_and_no_cli() {
        let config = AppConfig::resolve(&CliConfig::default(), FileConfig::default());
        assert_eq!(config.server.host, DEFAULT_HOST);
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.exporter.endpoint, DEFAULT_EXPORTER_ENDPOINT);
        assert_eq!(config.exporter.timeout_secs, DEFAULT_EXPORTER_TIMEOUT_SECS);
        assert_eq!(config.connector.attribute_name, DEFAULT_ATTRIBUTE_NAME);
        assert_eq!(config.connector.max_plan_depth, DEFAULT_MAX_PLAN_DEPTH);
        assert_eq!(config.connector.database_name, DEFAULT_DATABASE_NAME);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_file_config_overrides_defaults() {
        let file: FileConfig = serde_json::from_str(
            r#"{
                "server": {"port": 9999},
                "exporter": {"endpoint": "https://collector.internal/v1/traces"},
                "connector": {"max_plan_depth": 8, "database_name": "orders"}
            }"#,
        )
        .unwrap();
        let config = AppConfig::resolve(&CliConfig::default(), file);
        assert_eq!(config.server.port, 9999);
        assert_eq!(config.server.host, DEFAULT_HOST);
        assert_eq!(
            config.exporter.endpoint,
            "https://collector.internal/v1/traces"
        );
        assert_eq!(config.connector.max_plan_depth, 8);
        assert_eq!(config.connector.database_name, "orders");
    }

    #[test]
    fn test_cli_overrides_file_config() {
        let file: FileConfig = serde_json::from_str(
            r#"{"server": {"host": "0.0.0.0", "port": 9999}, "connector": {"attribute_name": "from_file"}}"#,
        )
        .unwrap();
        let cli = CliConfig {
            port: Some(5555),
            attribute_name: Some("from_cli".to_string()),
            ..CliConfig::default()
        };
        let config = AppConfig::resolve(&cli, file);
        assert_eq!(config.server.port, 5555);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.connector.attribute_name, "from_cli");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"connector": {{"database_name": "inventory"}}}}"#).unwrap();
        let cli = CliConfig {
            config: Some(file.path().to_path_buf()),
            ..CliConfig::default()
        };
        let config = AppConfig::load(&cli).unwrap();
        assert_eq!(config.connector.database_name, "inventory");
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let cli = CliConfig {
            config: Some(PathBuf::from("/nonexistent/pgbridge.json")),
            ..CliConfig::default()
        };
        assert!(AppConfig::load(&cli).is_err());
    }

    #[test]
    fn test_validate_rejects_empty_attribute_name() {
        let cli = CliConfig {
            attribute_name: Some(String::new()),
            ..CliConfig::default()
        };
        let config = AppConfig::resolve(&cli, FileConfig::default());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_depth() {
        let cli = CliConfig {
            max_plan_depth: Some(0),
            ..CliConfig::default()
        };
        let config = AppConfig::resolve(&cli, FileConfig::default());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_http_endpoint() {
        let cli = CliConfig {
            exporter_endpoint: Some("collector.internal:4317".to_string()),
            ..CliConfig::default()
        };
        let config = AppConfig::resolve(&cli, FileConfig::default());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_fields_are_collected() {
        let file: FileConfig =
            serde_json::from_str(r#"{"sevrer": {"port": 1}, "connector": {}}"#).unwrap();
        let extra = file.extra.as_object().unwrap();
        assert!(extra.contains_key("sevrer"));
    }
}
