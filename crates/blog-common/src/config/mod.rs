//! Configuration structs

mod app_config;

pub use app_config::{
    AppConfig, AppSettings, ConfigError, DatabaseConfig, Environment, RetentionConfig,
    StorageConfig, MAX_PURGE_INTERVAL_SECS, MAX_RETENTION_DAYS,
};
