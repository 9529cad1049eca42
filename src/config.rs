use std::env;
use anyhow::{Context, Result, bail};

/// Which key-value backend the dispatcher talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Spanner,
    Memory,
}

impl StoreBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            StoreBackend::Spanner => "spanner",
            StoreBackend::Memory => "memory",
        }
    }
}

/// How the binary receives requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeMode {
    /// Driven by the Lambda runtime API at the given address
    Lambda(String),
    /// Local axum server emulating the HTTP gateway
    Http,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpannerConfig {
    pub emulator_host: Option<String>,
    pub project: String,
    pub instance: String,
    pub database: String,
    pub auto_provision: bool,
}

impl SpannerConfig {
    pub fn database_path(&self) -> String {
        format!(
            "projects/{}/instances/{}/databases/{}",
            self.project, self.instance, self.database
        )
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub table_name: String,
    pub store_backend: StoreBackend,
    pub spanner: Option<SpannerConfig>,
    pub runtime: RuntimeMode,
    pub service_port: u16,
    pub service_host: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key).with_context(|| format!("{} environment variable is required", key))
        };

        let table_name = required("TABLE_NAME")?;
        if !is_valid_table_name(&table_name) {
            bail!(
                "TABLE_NAME must start with a letter and contain only letters, digits or '_', got '{}'",
                table_name
            );
        }

        let store_backend = match lookup("STORE_BACKEND").as_deref() {
            None | Some("spanner") => StoreBackend::Spanner,
            Some("memory") => StoreBackend::Memory,
            Some(other) => bail!("STORE_BACKEND must be one of: spanner, memory, got '{}'", other),
        };

        let spanner = match store_backend {
            StoreBackend::Spanner => {
                let emulator_host = lookup("SPANNER_EMULATOR_HOST");
                let auto_provision = match lookup("SPANNER_AUTO_PROVISION") {
                    Some(value) => value
                        .parse::<bool>()
                        .context("SPANNER_AUTO_PROVISION must be 'true' or 'false'")?,
                    None => emulator_host.is_some(),
                };

                Some(SpannerConfig {
                    emulator_host,
                    project: required("SPANNER_PROJECT")?,
                    instance: required("SPANNER_INSTANCE")?,
                    database: required("SPANNER_DATABASE")?,
                    auto_provision,
                })
            }
            StoreBackend::Memory => None,
        };

        let runtime = match lookup("AWS_LAMBDA_RUNTIME_API") {
            Some(api) => RuntimeMode::Lambda(api),
            None => RuntimeMode::Http,
        };

        let service_port = lookup("SERVICE_PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse::<u16>()
            .context("SERVICE_PORT must be a valid port number (0-65535)")?;

        let service_host = lookup("SERVICE_HOST")
            .unwrap_or_else(|| "0.0.0.0".to_string());

        Ok(Config {
            table_name,
            store_backend,
            spanner,
            runtime,
            service_port,
            service_host,
        })
    }

    pub fn log_startup(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Table: {}", self.table_name);
        tracing::info!("  Store backend: {}", self.store_backend.as_str());
        if let Some(spanner) = &self.spanner {
            tracing::info!("  Spanner emulator: {}",
                spanner.emulator_host.as_deref().unwrap_or("disabled (using production)"));
            tracing::info!("  Spanner database: {}", spanner.database_path());
            tracing::info!("  Spanner auto-provision: {}", spanner.auto_provision);
        }
        match &self.runtime {
            RuntimeMode::Lambda(api) => tracing::info!("  Lambda runtime API: {}", api),
            RuntimeMode::Http => tracing::info!(
                "  Service listening on: {}:{}", self.service_host, self.service_port
            ),
        }
    }
}

fn is_valid_table_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    const SPANNER_VARS: [(&str, &str); 4] = [
        ("TABLE_NAME", "items"),
        ("SPANNER_PROJECT", "test-project"),
        ("SPANNER_INSTANCE", "test-instance"),
        ("SPANNER_DATABASE", "test-database"),
    ];

    #[test]
    fn test_config_with_all_vars() {
        let mut vars = SPANNER_VARS.to_vec();
        vars.extend([
            ("SPANNER_EMULATOR_HOST", "localhost:9010"),
            ("SPANNER_AUTO_PROVISION", "false"),
            ("SERVICE_PORT", "8080"),
            ("SERVICE_HOST", "127.0.0.1"),
            ("AWS_LAMBDA_RUNTIME_API", "127.0.0.1:9001"),
        ]);

        let config = config_from(&vars).unwrap();

        assert_eq!(config.table_name, "items");
        assert_eq!(config.store_backend, StoreBackend::Spanner);
        let spanner = config.spanner.unwrap();
        assert_eq!(spanner.emulator_host, Some("localhost:9010".to_string()));
        assert!(!spanner.auto_provision);
        assert_eq!(
            spanner.database_path(),
            "projects/test-project/instances/test-instance/databases/test-database"
        );
        assert_eq!(config.runtime, RuntimeMode::Lambda("127.0.0.1:9001".to_string()));
        assert_eq!(config.service_port, 8080);
        assert_eq!(config.service_host, "127.0.0.1");
    }

    #[test]
    fn test_config_with_defaults() {
        let config = config_from(&SPANNER_VARS).unwrap();

        let spanner = config.spanner.unwrap();
        assert_eq!(spanner.emulator_host, None);
        assert!(!spanner.auto_provision);
        assert_eq!(config.runtime, RuntimeMode::Http);
        assert_eq!(config.service_port, 3000);
        assert_eq!(config.service_host, "0.0.0.0");
    }

    #[test]
    fn test_emulator_enables_auto_provision() {
        let mut vars = SPANNER_VARS.to_vec();
        vars.push(("SPANNER_EMULATOR_HOST", "localhost:9010"));

        let config = config_from(&vars).unwrap();
        assert!(config.spanner.unwrap().auto_provision);
    }

    #[test]
    fn test_memory_backend_needs_no_spanner_vars() {
        let config = config_from(&[("TABLE_NAME", "items"), ("STORE_BACKEND", "memory")]).unwrap();

        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert!(config.spanner.is_none());
    }

    #[test]
    fn test_missing_table_name() {
        let error = config_from(&[("STORE_BACKEND", "memory")]).unwrap_err();
        assert!(error.to_string().contains("TABLE_NAME"));
    }

    #[test]
    fn test_invalid_table_name() {
        let error = config_from(&[("TABLE_NAME", "items; DROP"), ("STORE_BACKEND", "memory")])
            .unwrap_err();
        assert!(error.to_string().contains("TABLE_NAME"));

        assert!(config_from(&[("TABLE_NAME", "1items"), ("STORE_BACKEND", "memory")]).is_err());
    }

    #[test]
    fn test_unknown_backend() {
        let error = config_from(&[("TABLE_NAME", "items"), ("STORE_BACKEND", "dynamo")])
            .unwrap_err();
        assert!(error.to_string().contains("STORE_BACKEND"));
    }

    #[test]
    fn test_missing_required_spanner_var() {
        let error = config_from(&SPANNER_VARS[..3]).unwrap_err();
        assert!(error.to_string().contains("SPANNER_DATABASE"));
    }

    #[test]
    fn test_invalid_port() {
        let mut vars = SPANNER_VARS.to_vec();
        vars.push(("SERVICE_PORT", "not-a-number"));

        let error = config_from(&vars).unwrap_err();
        assert!(error.to_string().contains("SERVICE_PORT"));
    }

    #[test]
    fn test_port_out_of_range() {
        let mut vars = SPANNER_VARS.to_vec();
        vars.push(("SERVICE_PORT", "99999"));

        assert!(config_from(&vars).is_err());
    }

    #[test]
    fn test_invalid_auto_provision_flag() {
        let mut vars = SPANNER_VARS.to_vec();
        vars.push(("SPANNER_AUTO_PROVISION", "sometimes"));

        let error = config_from(&vars).unwrap_err();
        assert!(error.to_string().contains("SPANNER_AUTO_PROVISION"));
    }
}
