use serde::Deserialize;

/// Root application configuration. Loaded from environment variables
/// with the prefix `ADSERVE__` and optional TOML config files.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_node_id")]
    pub node_id: String,
    #[serde(default)]
    pub serving: ServingConfig,
    #[serde(default)]
    pub redis: RedisConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServingConfig {
    /// Click-through routes redirect here when an ad has no target URL.
    #[serde(default = "default_fallback_url")]
    pub fallback_url: String,
    /// How many placements a single render request may fill.
    #[serde(default = "default_max_placements")]
    pub max_placements: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    /// Counter persistence is skipped entirely when disabled.
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_redis_url")]
    pub url: String,
    #[serde(default = "default_flush_interval_ms")]
    pub flush_interval_ms: u64,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

// Default functions
fn default_node_id() -> String {
    "node-01".to_string()
}
fn default_fallback_url() -> String {
    "/".to_string()
}
fn default_max_placements() -> usize {
    10
}
fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}
fn default_flush_interval_ms() -> u64 {
    5000
}
fn default_connect_timeout_ms() -> u64 {
    5000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            node_id: default_node_id(),
            serving: ServingConfig::default(),
            redis: RedisConfig::default(),
        }
    }
}

impl Default for ServingConfig {
    fn default() -> Self {
        Self {
            fallback_url: default_fallback_url(),
            max_placements: default_max_placements(),
        }
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: default_redis_url(),
            flush_interval_ms: default_flush_interval_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and optional config file.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("ADSERVE")
                .separator("__")
                .try_parsing(true)
                .list_separator(","),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.node_id, "node-01");
        assert!(!config.redis.enabled);
        assert_eq!(config.serving.fallback_url, "/");
    }
}
