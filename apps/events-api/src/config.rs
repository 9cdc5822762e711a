//! Configuration for the Events API

use core_config::{
    AppInfo, ConfigError, FromEnv, app_info, cors::CorsConfig, env_or_default, env_parse_or,
    server::ServerConfig,
};
use database::mongodb::MongoConfig;
use std::path::PathBuf;
use std::time::Duration;

pub use core_config::Environment;

/// Collection holding event documents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventsConfig {
    pub collection: String,
}

impl FromEnv for EventsConfig {
    /// `EVENTS_COLLECTION` (default: `events`)
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            collection: env_or_default("EVENTS_COLLECTION", "events"),
        })
    }
}

/// Where uploaded images go and how large a request body may be.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadConfig {
    pub dir: PathBuf,
    pub max_bytes: usize,
}

impl FromEnv for UploadConfig {
    /// - `UPLOAD_DIR` (default: `uploads`)
    /// - `UPLOAD_MAX_BYTES` (default: 10 MiB)
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            dir: PathBuf::from(env_or_default("UPLOAD_DIR", "uploads")),
            max_bytes: env_parse_or("UPLOAD_MAX_BYTES", "10485760")?,
        })
    }
}

/// Application configuration
/// Composes shared config components from the `config` library
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub environment: Environment,
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub mongodb: MongoConfig,
    pub events: EventsConfig,
    pub upload: UploadConfig,
    /// Bound on cleanup after the shutdown signal
    pub shutdown_timeout: Duration,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?;
        let cors = CorsConfig::from_env()?;
        let mongodb = MongoConfig::from_env()?;
        let events = EventsConfig::from_env()?;
        let upload = UploadConfig::from_env()?;
        let shutdown_timeout =
            Duration::from_secs(env_parse_or("SHUTDOWN_TIMEOUT_SECS", "30")?);

        Ok(Self {
            app: app_info!(),
            environment,
            server,
            cors,
            mongodb,
            events,
            upload,
            shutdown_timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MONGO: [(&str, Option<&str>); 2] = [
        ("MONGODB_URL", Some("mongodb://localhost:27017")),
        ("MONGODB_DATABASE", Some("events_db")),
    ];

    #[test]
    fn test_config_defaults() {
        temp_env::with_vars(
            [
                MONGO[0],
                MONGO[1],
                ("PORT", None),
                ("EVENTS_COLLECTION", None),
                ("UPLOAD_DIR", None),
                ("UPLOAD_MAX_BYTES", None),
                ("SHUTDOWN_TIMEOUT_SECS", None),
            ],
            || {
                let config = Config::from_env().unwrap();

                assert_eq!(config.app.name, "events_api");
                assert_eq!(config.server.port, 3000);
                assert_eq!(config.mongodb.database(), "events_db");
                assert_eq!(config.events.collection, "events");
                assert_eq!(config.upload.dir, PathBuf::from("uploads"));
                assert_eq!(config.upload.max_bytes, 10 * 1024 * 1024);
                assert_eq!(config.shutdown_timeout, Duration::from_secs(30));
            },
        );
    }

    #[test]
    fn test_config_overrides() {
        temp_env::with_vars(
            [
                MONGO[0],
                MONGO[1],
                ("PORT", Some("8081")),
                ("EVENTS_COLLECTION", Some("meetups")),
                ("UPLOAD_DIR", Some("/var/lib/events/uploads")),
                ("UPLOAD_MAX_BYTES", Some("2048")),
                ("SHUTDOWN_TIMEOUT_SECS", Some("5")),
            ],
            || {
                let config = Config::from_env().unwrap();

                assert_eq!(config.server.port, 8081);
                assert_eq!(config.events.collection, "meetups");
                assert_eq!(config.upload.dir, PathBuf::from("/var/lib/events/uploads"));
                assert_eq!(config.upload.max_bytes, 2048);
                assert_eq!(config.shutdown_timeout, Duration::from_secs(5));
            },
        );
    }

    #[test]
    fn test_config_requires_mongodb_url() {
        temp_env::with_vars(
            [
                ("MONGODB_URL", None::<&str>),
                ("MONGO_URL", None),
                ("MONGODB_DATABASE", Some("events_db")),
            ],
            || {
                let err = Config::from_env().unwrap_err();
                assert!(err.to_string().contains("MONGODB_URL"));
            },
        );
    }

    #[test]
    fn test_config_rejects_bad_upload_limit() {
        temp_env::with_vars(
            [MONGO[0], MONGO[1], ("UPLOAD_MAX_BYTES", Some("ten megs"))],
            || {
                let err = Config::from_env().unwrap_err();
                assert!(err.to_string().contains("UPLOAD_MAX_BYTES"));
            },
        );
    }
}
