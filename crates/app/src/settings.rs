//! Handles settings for the application.
//!
//! Values are read from an optional `settings.toml` in the working directory
//! and overridden by `HOSPITAL_LEDGER__<SECTION>__<KEY>` environment
//! variables, e.g. `HOSPITAL_LEDGER__SERVER__PORT=8080`.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
}

#[derive(Debug, Default, Deserialize)]
pub struct Ledger {
    /// How long a write waits for the domain lock before reporting a
    /// conflict. Engine default when absent.
    pub lock_timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Server,
    #[serde(default)]
    pub ledger: Ledger,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings").required(false))
            .add_source(
                Environment::with_prefix("HOSPITAL_LEDGER")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        settings.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    fn from_toml(raw: &str) -> Result<Settings, ConfigError> {
        Config::builder()
            .add_source(File::from_str(raw, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    #[test]
    fn reads_sqlite_database_and_defaults() {
        let settings = from_toml(
            r#"
            [server]
            port = 3000
            database = { sqlite = "ledger.db" }
            "#,
        )
        .unwrap();

        assert_eq!(settings.app.level, "info");
        assert_eq!(settings.server.port, 3000);
        assert!(matches!(settings.server.database, Database::Sqlite(ref path) if path == "ledger.db"));
        assert!(settings.ledger.lock_timeout_ms.is_none());
    }

    #[test]
    fn reads_memory_database_and_ledger_section() {
        let settings = from_toml(
            r#"
            [app]
            level = "debug"

            [server]
            bind = "0.0.0.0"
            port = 8080
            database = "memory"

            [ledger]
            lock_timeout_ms = 250
            "#,
        )
        .unwrap();

        assert_eq!(settings.app.level, "debug");
        assert_eq!(settings.server.bind.as_deref(), Some("0.0.0.0"));
        assert!(matches!(settings.server.database, Database::Memory));
        assert_eq!(settings.ledger.lock_timeout_ms, Some(250));
    }

    #[test]
    fn server_section_is_required() {
        assert!(from_toml("[app]\nlevel = \"warn\"").is_err());
    }
}
