use serde::Deserialize;

/// Engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub engine: EngineSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Storage backend: "memory" or "postgres"
    pub backend: String,
    /// Connection URL for the postgres backend
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineSettings {
    /// Model prompts and commits are reassigned to when their provider is
    /// deleted
    pub fallback_model_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            logging: LoggingConfig::default(),
            engine: EngineSettings::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: "memory".to_string(),
            url: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            fallback_model_id: None,
        }
    }
}

impl EngineConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("PVC")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();

        assert_eq!(config.storage.backend, "memory");
        assert!(config.storage.url.is_none());
        assert_eq!(config.logging.level, "info");
        assert!(config.engine.fallback_model_id.is_none());
    }
}
