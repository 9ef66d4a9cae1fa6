//! Configuration loading

mod engine_config;

pub use engine_config::{
    EngineConfig, EngineSettings, LogFormat, LoggingConfig, StorageConfig,
};
