use serde::{Deserialize, Serialize};
use std::path::Path;

use undugu_types::error::ClientError;
use undugu_types::primitives::Address;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Donation contract instance this client talks to.
    pub contract_address: Address,
    /// Campaign contract whose admin list gates the browse-everything view.
    pub platform_address: Address,
    pub rpc: RpcSettings,
    pub cache: CacheSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcSettings {
    pub url: String,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    /// View cache entry lifetime in seconds.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    /// Path scope prefixed to every cache key.
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

fn default_ttl_secs() -> u64 {
    3600
}

fn default_namespace() -> String {
    "my-fundraisers".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            contract_address: String::new(),
            platform_address: String::new(),
            rpc: RpcSettings {
                url: "http://127.0.0.1:8545".to_string(),
                request_timeout_secs: default_timeout_secs(),
            },
            cache: CacheSettings {
                ttl_secs: default_ttl_secs(),
                namespace: default_namespace(),
            },
            logging: LoggingSettings {
                level: "info".to_string(),
            },
        }
    }
}

impl ClientConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self, ClientError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ClientError::Serialization {
            reason: format!("failed to read config file '{}': {}", path, e),
        })?;
        let config: ClientConfig =
            toml::from_str(&contents).map_err(|e| ClientError::Serialization {
                reason: format!("failed to parse config file '{}': {}", path, e),
            })?;
        Ok(config)
    }

    /// Write a default configuration file into the given directory.
    pub fn init(dir: &str) -> Result<(), ClientError> {
        let dir_path = Path::new(dir);
        if !dir_path.exists() {
            std::fs::create_dir_all(dir_path).map_err(|e| ClientError::Serialization {
                reason: format!("failed to create '{}': {}", dir, e),
            })?;
        }

        let config = ClientConfig::default();
        let toml_str = toml::to_string_pretty(&config).map_err(|e| ClientError::Serialization {
            reason: format!("failed to serialize default config: {}", e),
        })?;

        let config_path = dir_path.join("undugu.toml");
        std::fs::write(&config_path, toml_str).map_err(|e| ClientError::Serialization {
            reason: format!("failed to write '{}': {}", config_path.display(), e),
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.rpc.url, "http://127.0.0.1:8545");
        assert_eq!(config.cache.ttl_secs, 3600);
        assert_eq!(config.cache.namespace, "my-fundraisers");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_config_toml_roundtrip() {
        let config = ClientConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let back: ClientConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(back.rpc.url, config.rpc.url);
        assert_eq!(back.cache.ttl_secs, config.cache.ttl_secs);
    }

    #[test]
    fn test_init_then_load() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().to_str().unwrap();
        ClientConfig::init(dir).unwrap();

        let config_path = tmp.path().join("undugu.toml");
        let config = ClientConfig::load(config_path.to_str().unwrap()).unwrap();
        assert_eq!(config.cache.ttl_secs, 3600);
    }

    #[test]
    fn test_load_nonexistent_file() {
        assert!(ClientConfig::load("/nonexistent/undugu.toml").is_err());
    }

    #[test]
    fn test_missing_optional_fields_take_defaults() {
        let minimal = r#"
            contract_address = "0x01"
            platform_address = "0x02"

            [rpc]
            url = "http://gateway.example"

            [cache]

            [logging]
            level = "debug"
        "#;
        let config: ClientConfig = toml::from_str(minimal).unwrap();
        assert_eq!(config.rpc.request_timeout_secs, 10);
        assert_eq!(config.cache.ttl_secs, 3600);
    }
}
