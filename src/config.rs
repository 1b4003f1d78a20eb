use std::{collections::HashMap, path::PathBuf};

use config::{Config as ConfigLib, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub tls: TlsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub environment: ApiEnvironment,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TlsConfig {
    /// RP client certificate and private key, concatenated PEM.
    pub identity_pem: PathBuf,
    /// Root CA of the central BankID server for the selected environment.
    pub server_ca_pem: PathBuf,
}

/// The central server to talk to. Endpoints and peer names are fixed per
/// environment and not configurable individually.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiEnvironment {
    Test,
    Production,
}

impl ApiEnvironment {
    pub fn api_url(&self) -> &'static str {
        match self {
            ApiEnvironment::Test => "https://appapi2.test.bankid.com/rp/v5.1/",
            ApiEnvironment::Production => "https://appapi2.bankid.com/rp/v5.1/",
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_sources(None)
    }

    pub fn load_with_sources(
        env_vars: Option<HashMap<String, String>>,
    ) -> Result<Self, ConfigError> {
        let mut builder = ConfigLib::builder()
            .set_default("api.environment", "test")?
            .set_default("api.timeout_secs", 30)?
            .set_default("tls.identity_pem", "certs/rp_identity.pem")?
            .set_default("tls.server_ca_pem", "certs/appapi2.test.bankid.com.pem")?
            .add_source(File::with_name("config/settings").required(false));

        // If env_vars is provided, we use it instead of system environment
        // This is to avoid systems variables pollution across tests
        if let Some(vars) = env_vars {
            for (key, value) in vars {
                builder = builder.set_override(&key, value)?;
            }
        } else {
            // Use system environment variables
            // Should be in the format BANKID_API__ENVIRONMENT or BANKID_TLS__IDENTITY_PEM
            builder = builder.add_source(
                Environment::with_prefix("BANKID")
                    .prefix_separator("_")
                    .separator("__"),
            );
        }

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::load().expect("Failed to load config");

        assert_eq!(config.api.environment, ApiEnvironment::Test);
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(
            config.api.environment.api_url(),
            "https://appapi2.test.bankid.com/rp/v5.1/"
        );
    }

    #[test]
    fn test_env_config() {
        let mut env_vars = HashMap::new();
        env_vars.insert("api.environment".to_string(), "production".to_string());
        env_vars.insert("api.timeout_secs".to_string(), "10".to_string());
        env_vars.insert("tls.identity_pem".to_string(), "/etc/rp/id.pem".to_string());

        let config = Config::load_with_sources(Some(env_vars)).expect("Failed to load config");

        assert_eq!(config.api.environment, ApiEnvironment::Production);
        assert_eq!(
            config.api.environment.api_url(),
            "https://appapi2.bankid.com/rp/v5.1/"
        );
        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.tls.identity_pem, PathBuf::from("/etc/rp/id.pem"));
    }

    #[test]
    fn test_partial_env_override() {
        let mut env_vars = HashMap::new();
        // We just override the timeout
        env_vars.insert("api.timeout_secs".to_string(), "5".to_string());

        let config = Config::load_with_sources(Some(env_vars)).expect("Failed to load config");

        assert_eq!(config.api.timeout_secs, 5);
        // The other values should use default
        assert_eq!(config.api.environment, ApiEnvironment::Test);
        assert_eq!(
            config.tls.server_ca_pem,
            PathBuf::from("certs/appapi2.test.bankid.com.pem")
        );
    }
}
